use time::OffsetDateTime;

/// Istante corrente in UTC troncato al millisecondo, la precisione delle date BSON.
/// Così il timestamp restituito da un insert coincide con quello riletto dal DB.
pub fn now_timestamp() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    now.replace_nanosecond(u32::from(now.millisecond()) * 1_000_000)
        .unwrap_or(now)
}
