//! Configurazione del processo, letta dalle variabili d'ambiente (dopo aver caricato `.env`).

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use anyhow::Context;

use crate::realtime::{self, RealtimeConfig};

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub mongo_uri: Option<String>,
    pub ably_api_key: Option<String>,
    pub ably_host: String,
}

impl Config {
    /// Legge PORT, MONGO_URI, ABLY_API_KEY e ABLY_REALTIME_HOST dall'ambiente.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Come `from_env` ma con una sorgente qualsiasi, così i test non toccano l'ambiente.
    /// Le variabili vuote valgono come assenti.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("parse PORT {:?}", raw))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            port,
            mongo_uri: get("MONGO_URI"),
            ably_api_key: get("ABLY_API_KEY"),
            ably_host: get("ABLY_REALTIME_HOST")
                .unwrap_or_else(|| realtime::ably::DEFAULT_HOST.to_string()),
        })
    }

    /// Indirizzo di ascolto: tutte le interfacce sulla porta configurata.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), self.port)
    }

    /// Configurazione del subscriber, `None` se manca la chiave Ably.
    pub fn realtime(&self) -> Option<RealtimeConfig> {
        self.ably_api_key.as_ref().map(|key| RealtimeConfig {
            api_key: key.clone(),
            host: self.ably_host.clone(),
            channel: realtime::CHANNEL.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.mongo_uri, None);
        assert_eq!(config.ably_api_key, None);
        assert_eq!(config.ably_host, "realtime.ably.io");
        assert!(config.realtime().is_none());
        assert_eq!(config.bind_addr().to_string(), "0.0.0.0:3000");
    }

    #[test]
    fn reads_all_variables() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("MONGO_URI", "mongodb://localhost:27017/chat"),
            ("ABLY_API_KEY", "app.key:secret"),
            ("ABLY_REALTIME_HOST", "eu.realtime.example"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.mongo_uri.as_deref(), Some("mongodb://localhost:27017/chat"));

        let rt = config.realtime().unwrap();
        assert_eq!(rt.api_key, "app.key:secret");
        assert_eq!(rt.host, "eu.realtime.example");
        assert_eq!(rt.channel, "chat");
    }

    #[test]
    fn empty_values_count_as_missing() {
        let config = config_from(&[("PORT", ""), ("MONGO_URI", "  ")]).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.mongo_uri, None);
    }

    #[test]
    fn bad_port_is_an_error() {
        assert!(config_from(&[("PORT", "porta")]).is_err());
        assert!(config_from(&[("PORT", "70000")]).is_err());
    }
}
