use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_ADMIN_ROLE: &str = "admin";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
    #[error("{key} must be greater than zero")]
    Zero { key: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            _ => Err(()),
        }
    }
}

/// Server settings, read from Shuttle secrets with defaults for anything
/// missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Role a principal needs to create or delete elections.
    /// Configured via `ADMIN_ROLE`.
    pub admin_role: String,
    /// Upper bound on a single store call.
    /// Configured via `STORE_TIMEOUT_MS`.
    pub store_timeout: Duration,
    /// How often phases are re-evaluated for change notifications.
    /// Configured via `STATUS_TICK_SECS`.
    pub status_tick: Duration,
    /// Compare-and-swap attempts per vote before giving up.
    /// Configured via `MAX_CAST_ATTEMPTS`.
    pub max_cast_attempts: u32,
    /// Buffered notifications per subscriber.
    /// Configured via `NOTIFY_CAPACITY`.
    pub notify_capacity: usize,
    /// Configured via `STORE_BACKEND` (`postgres` or `memory`).
    pub store_backend: StoreBackend,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            admin_role: DEFAULT_ADMIN_ROLE.to_string(),
            store_timeout: Duration::from_millis(5_000),
            status_tick: Duration::from_secs(1),
            max_cast_attempts: 64,
            notify_capacity: 64,
            store_backend: StoreBackend::Postgres,
        }
    }
}

fn parse<T: FromStr>(key: &'static str, raw: Option<String>) -> Result<Option<T>, ConfigError> {
    match raw {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

fn positive<T: PartialEq + Default>(key: &'static str, value: T) -> Result<T, ConfigError> {
    if value == T::default() {
        Err(ConfigError::Zero { key })
    } else {
        Ok(value)
    }
}

impl Config {
    /// Builds the config from a key lookup, e.g. `SecretStore::get`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let admin_role = lookup("ADMIN_ROLE")
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .unwrap_or(defaults.admin_role);

        let store_timeout = match parse::<u64>("STORE_TIMEOUT_MS", lookup("STORE_TIMEOUT_MS"))? {
            Some(ms) => Duration::from_millis(positive("STORE_TIMEOUT_MS", ms)?),
            None => defaults.store_timeout,
        };
        let status_tick = match parse::<u64>("STATUS_TICK_SECS", lookup("STATUS_TICK_SECS"))? {
            Some(secs) => Duration::from_secs(positive("STATUS_TICK_SECS", secs)?),
            None => defaults.status_tick,
        };
        let max_cast_attempts = match parse::<u32>("MAX_CAST_ATTEMPTS", lookup("MAX_CAST_ATTEMPTS"))? {
            Some(n) => positive("MAX_CAST_ATTEMPTS", n)?,
            None => defaults.max_cast_attempts,
        };
        let notify_capacity = match parse::<usize>("NOTIFY_CAPACITY", lookup("NOTIFY_CAPACITY"))? {
            Some(n) => positive("NOTIFY_CAPACITY", n)?,
            None => defaults.notify_capacity,
        };
        let store_backend = parse::<StoreBackend>("STORE_BACKEND", lookup("STORE_BACKEND"))?
            .unwrap_or(defaults.store_backend);

        Ok(Self {
            admin_role,
            store_timeout,
            status_tick,
            max_cast_attempts,
            notify_capacity,
            store_backend,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        assert_eq!(Config::from_lookup(lookup(&[])).unwrap(), Config::default());
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("ADMIN_ROLE", " backend "),
            ("STORE_TIMEOUT_MS", "250"),
            ("STORE_BACKEND", "Memory"),
            ("MAX_CAST_ATTEMPTS", "8"),
        ]))
        .unwrap();
        assert_eq!(config.admin_role, "backend");
        assert_eq!(config.store_timeout, Duration::from_millis(250));
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.max_cast_attempts, 8);
        assert_eq!(config.status_tick, Duration::from_secs(1));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            Config::from_lookup(lookup(&[("STORE_TIMEOUT_MS", "soon")])),
            Err(ConfigError::Invalid { key: "STORE_TIMEOUT_MS", .. })
        ));
        assert_eq!(
            Config::from_lookup(lookup(&[("MAX_CAST_ATTEMPTS", "0")])),
            Err(ConfigError::Zero { key: "MAX_CAST_ATTEMPTS" })
        );
        assert!(Config::from_lookup(lookup(&[("STORE_BACKEND", "mongo")])).is_err());
    }
}
