//! Process configuration from the environment (`.env` is loaded by `main`).

use std::str::FromStr;

use crate::domain::value_objects::DEFAULT_CURRENCY;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" | "" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Invalid { key: "LOG_FORMAT", value: other.to_string() }),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,
    pub currency: String,
    pub default_country: String,
    /// Idle minutes before a session is dropped; 0 keeps sessions forever.
    pub session_idle_minutes: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8083,
            log_format: LogFormat::Pretty,
            currency: DEFAULT_CURRENCY.to_string(),
            default_country: "ID".to_string(),
            session_idle_minutes: 120,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(host) = lookup("HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("PORT") {
            config.port = port.trim().parse().map_err(|_| ConfigError::Invalid { key: "PORT", value: port })?;
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            config.log_format = format.parse()?;
        }
        if let Some(currency) = lookup("CURRENCY") {
            config.currency = currency.trim().to_uppercase();
        }
        if let Some(country) = lookup("DEFAULT_COUNTRY") {
            config.default_country = country.trim().to_uppercase();
        }
        if let Some(minutes) = lookup("SESSION_IDLE_MINUTES") {
            config.session_idle_minutes = minutes
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { key: "SESSION_IDLE_MINUTES", value: minutes })?;
        }
        Ok(config)
    }

    pub fn bind_address(&self) -> String { format!("{}:{}", self.host, self.port) }

    pub fn session_idle(&self) -> Option<chrono::Duration> {
        (self.session_idle_minutes > 0).then(|| chrono::Duration::minutes(i64::from(self.session_idle_minutes)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.bind_address(), "0.0.0.0:8083");
        assert_eq!(config.session_idle(), Some(chrono::Duration::minutes(120)));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[("PORT", "9000"), ("LOG_FORMAT", "JSON"), ("CURRENCY", "idr")])).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.currency, "IDR");
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(Config::from_lookup(lookup(&[("PORT", "http")])), Err(ConfigError::Invalid { key: "PORT", .. })));
        assert!(Config::from_lookup(lookup(&[("LOG_FORMAT", "xml")])).is_err());
        assert!(matches!(
            Config::from_lookup(lookup(&[("SESSION_IDLE_MINUTES", "soon")])),
            Err(ConfigError::Invalid { key: "SESSION_IDLE_MINUTES", .. })
        ));
    }

    #[test]
    fn test_session_idle_can_be_disabled() {
        let config = Config::from_lookup(lookup(&[("SESSION_IDLE_MINUTES", "0")])).unwrap();
        assert_eq!(config.session_idle(), None);
        let config = Config::from_lookup(lookup(&[("SESSION_IDLE_MINUTES", "15")])).unwrap();
        assert_eq!(config.session_idle(), Some(chrono::Duration::minutes(15)));
    }
}
