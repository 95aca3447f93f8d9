use crate::worker::DEFAULT_RECEIVE_WAIT;
use std::time::Duration;
use thiserror::Error;

pub const QUEUE_CONNECTION_STRING: &str = "QueueConnectionString";
pub const QUEUE_NAME: &str = "QueueName";
pub const QUEUE_WAIT_SECONDS: &str = "QueueWaitSeconds";
pub const RELAY_HOST: &str = "DAPR_HTTP_HOST";
pub const RELAY_PORT: &str = "DAPR_HTTP_PORT";
pub const TARGET_APP: &str = "TargetApp";
pub const RELAY_TIMEOUT_SECONDS: &str = "RelayTimeoutSeconds";

const DEFAULT_RELAY_HOST: &str = "localhost";
const DEFAULT_RELAY_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("'{var}' config value is required. Please add an environment variable or app setting.")]
    MissingRequired { var: &'static str },

    #[error("invalid value for '{var}': {value}")]
    InvalidValue { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueConfig {
    /// Endpoint of the queue service.
    pub connection: String,
    pub queue_name: String,
    pub wait: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,
    pub target_app: String,
    pub timeout: Duration,
}

impl RelayConfig {
    /// Sidecar service-invocation URL of the downstream store method.
    pub fn url(&self) -> String {
        format!(
            "http://{}:{}/v1.0/invoke/{}/method/store",
            self.host, self.port, self.target_app
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub queue: QueueConfig,
    pub relay: RelayConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Resolves every setting through `lookup`. Empty values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &'static str| lookup(var).filter(|v| !v.trim().is_empty());
        let required = |var: &'static str| get(var).ok_or(ConfigError::MissingRequired { var });

        let connection = required(QUEUE_CONNECTION_STRING)?;
        if !connection.starts_with("http://") && !connection.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                var: QUEUE_CONNECTION_STRING,
                value: connection,
            });
        }
        let queue = QueueConfig {
            connection,
            queue_name: required(QUEUE_NAME)?,
            wait: match get(QUEUE_WAIT_SECONDS) {
                Some(v) => parse_secs(QUEUE_WAIT_SECONDS, v)?,
                None => DEFAULT_RECEIVE_WAIT,
            },
        };

        let port = required(RELAY_PORT)?;
        let relay = RelayConfig {
            host: get(RELAY_HOST).unwrap_or_else(|| DEFAULT_RELAY_HOST.to_string()),
            port: port.trim().parse().map_err(|_| ConfigError::InvalidValue {
                var: RELAY_PORT,
                value: port.clone(),
            })?,
            target_app: required(TARGET_APP)?,
            timeout: match get(RELAY_TIMEOUT_SECONDS) {
                Some(v) => parse_secs(RELAY_TIMEOUT_SECONDS, v)?,
                None => DEFAULT_RELAY_TIMEOUT,
            },
        };

        Ok(Self { queue, relay })
    }
}

fn parse_secs(var: &'static str, value: String) -> Result<Duration, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(_) => Err(ConfigError::InvalidValue { var, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var: &str| map.get(var).cloned()
    }

    fn full() -> Vec<(&'static str, &'static str)> {
        vec![
            (QUEUE_CONNECTION_STRING, "http://localhost:4566"),
            (QUEUE_NAME, "orders"),
            (RELAY_PORT, "3500"),
            (TARGET_APP, "store"),
        ]
    }

    #[test]
    fn test_defaults_and_url() {
        let config = Config::from_lookup(env(&full())).unwrap();

        assert_eq!(config.queue.queue_name, "orders");
        assert_eq!(config.queue.wait, DEFAULT_RECEIVE_WAIT);
        assert_eq!(config.relay.timeout, Duration::from_secs(30));
        assert_eq!(
            config.relay.url(),
            "http://localhost:3500/v1.0/invoke/store/method/store"
        );
    }

    #[test]
    fn test_overrides() {
        let mut pairs = full();
        pairs.push((RELAY_HOST, "sidecar"));
        pairs.push((QUEUE_WAIT_SECONDS, "5"));
        pairs.push((RELAY_TIMEOUT_SECONDS, "2"));

        let config = Config::from_lookup(env(&pairs)).unwrap();

        assert_eq!(config.queue.wait, Duration::from_secs(5));
        assert_eq!(config.relay.timeout, Duration::from_secs(2));
        assert_eq!(
            config.relay.url(),
            "http://sidecar:3500/v1.0/invoke/store/method/store"
        );
    }

    #[test]
    fn test_missing_values() {
        for var in [QUEUE_CONNECTION_STRING, QUEUE_NAME, RELAY_PORT, TARGET_APP] {
            let pairs: Vec<_> = full().into_iter().filter(|(k, _)| *k != var).collect();

            let res = Config::from_lookup(env(&pairs));

            assert_eq!(res, Err(ConfigError::MissingRequired { var }));
        }
    }

    #[test]
    fn test_empty_value_is_missing() {
        let mut pairs = full();
        pairs.retain(|(k, _)| *k != TARGET_APP);
        pairs.push((TARGET_APP, "  "));

        let res = Config::from_lookup(env(&pairs));

        assert_eq!(res, Err(ConfigError::MissingRequired { var: TARGET_APP }));
    }

    #[test]
    fn test_invalid_values() {
        let mut pairs = full();
        pairs.retain(|(k, _)| *k != RELAY_PORT);
        pairs.push((RELAY_PORT, "not-a-port"));
        assert!(matches!(
            Config::from_lookup(env(&pairs)),
            Err(ConfigError::InvalidValue { var: RELAY_PORT, .. })
        ));

        let mut pairs = full();
        pairs.retain(|(k, _)| *k != QUEUE_CONNECTION_STRING);
        pairs.push((QUEUE_CONNECTION_STRING, "localhost:4566"));
        assert!(matches!(
            Config::from_lookup(env(&pairs)),
            Err(ConfigError::InvalidValue {
                var: QUEUE_CONNECTION_STRING,
                ..
            })
        ));
    }
}
