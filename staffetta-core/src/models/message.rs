use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Messaggio di chat persistito dal server, unica entità del relay.
/// Immutabile una volta creato.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Identità assegnata dallo store (object id esadecimale).
    #[serde(rename = "_id")]
    pub id: String,
    pub text: String,
    /// Istante di creazione, UTC con sempre tre cifre di millisecondi.
    #[serde(with = "millis_utc")]
    pub timestamp: OffsetDateTime,
}

/// Formato fisso `2025-11-02T10:20:30.100Z`: i millisecondi non vengono mai accorciati.
/// In lettura si accetta qualsiasi RFC3339.
mod millis_utc {
    use serde::{de, ser, Deserialize, Deserializer, Serializer};
    use time::format_description::well_known::Rfc3339;
    use time::macros::format_description;
    use time::{OffsetDateTime, UtcOffset};

    pub fn serialize<S: Serializer>(ts: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        let format = format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
        );
        let formatted = ts
            .to_offset(UtcOffset::UTC)
            .format(format)
            .map_err(ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<OffsetDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        OffsetDateTime::parse(&raw, &Rfc3339).map_err(de::Error::custom)
    }
}
