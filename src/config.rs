//! Configuration for the gateway client and the poll loop, loadable from the environment.

use std::time::Duration;

use url::Url;

use crate::client::Credentials;
use crate::domain::ValidationError;

pub const ENV_GATEWAY_URL: &str = "MPESA_GATEWAY_URL";
pub const ENV_HTTP_TIMEOUT_SECONDS: &str = "MPESA_HTTP_TIMEOUT_SECONDS";
pub const ENV_USER_AGENT: &str = "MPESA_USER_AGENT";
pub const ENV_CONSUMER_KEY: &str = "MPESA_CONSUMER_KEY";
pub const ENV_CONSUMER_SECRET: &str = "MPESA_CONSUMER_SECRET";
pub const ENV_POLL_MAX_ATTEMPTS: &str = "MPESA_POLL_MAX_ATTEMPTS";
pub const ENV_POLL_INTERVAL_MS: &str = "MPESA_POLL_INTERVAL_MS";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} environment variable is required")]
    Missing { var: &'static str },

    #[error("{var} is not a valid URL: {source}")]
    InvalidUrl {
        var: &'static str,
        #[source]
        source: url::ParseError,
    },

    #[error("{var} is not a valid number: {value}")]
    InvalidNumber { var: &'static str, value: String },

    #[error("invalid credentials: {0}")]
    Credentials(#[from] ValidationError),
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Backend that proxies the STK push API; endpoints are joined onto it.
    pub base_url: Url,
    pub timeout: Option<Duration>,
    pub user_agent: Option<String>,
    /// Only needed for [`crate::GatewayClient::generate_token`].
    pub credentials: Option<Credentials>,
}

impl GatewayConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: None,
            user_agent: None,
            credentials: None,
        }
    }

    /// Read `MPESA_GATEWAY_URL` (required) and the optional timeout, user-agent,
    /// and consumer key/secret variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_url = lookup(ENV_GATEWAY_URL)
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::Missing {
                var: ENV_GATEWAY_URL,
            })?;
        let base_url = Url::parse(raw_url.trim()).map_err(|source| ConfigError::InvalidUrl {
            var: ENV_GATEWAY_URL,
            source,
        })?;

        let timeout = match lookup(ENV_HTTP_TIMEOUT_SECONDS) {
            Some(value) => Some(Duration::from_secs(value.trim().parse::<u64>().map_err(
                |_| ConfigError::InvalidNumber {
                    var: ENV_HTTP_TIMEOUT_SECONDS,
                    value: value.clone(),
                },
            )?)),
            None => None,
        };

        let credentials = match (lookup(ENV_CONSUMER_KEY), lookup(ENV_CONSUMER_SECRET)) {
            (Some(key), Some(secret)) => Some(Credentials::new(key, secret)?),
            _ => None,
        };

        Ok(Self {
            base_url,
            timeout,
            user_agent: lookup(ENV_USER_AGENT),
            credentials,
        })
    }
}

/// Poll loop limits: how many status checks, and how far apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub attempt_budget: u32,
    pub interval: Duration,
}

impl PollConfig {
    pub const DEFAULT_ATTEMPT_BUDGET: u32 = 30;
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(2000);

    /// Read `MPESA_POLL_MAX_ATTEMPTS` and `MPESA_POLL_INTERVAL_MS`.
    ///
    /// Missing, unparseable, or zero values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();
        cfg.attempt_budget = lookup(ENV_POLL_MAX_ATTEMPTS)
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(cfg.attempt_budget);
        cfg.interval = lookup(ENV_POLL_INTERVAL_MS)
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|v| *v > 0)
            .map(Duration::from_millis)
            .unwrap_or(cfg.interval);
        cfg
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            attempt_budget: Self::DEFAULT_ATTEMPT_BUDGET,
            interval: Self::DEFAULT_INTERVAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn poll_config_defaults_to_thirty_checks_every_two_seconds() {
        let cfg = PollConfig::default();
        assert_eq!(cfg.attempt_budget, 30);
        assert_eq!(cfg.interval, Duration::from_millis(2000));
    }

    #[test]
    fn poll_config_reads_overrides_and_ignores_garbage() {
        let cfg = PollConfig::from_lookup(env(&[
            (ENV_POLL_MAX_ATTEMPTS, "5"),
            (ENV_POLL_INTERVAL_MS, " 250 "),
        ]));
        assert_eq!(cfg.attempt_budget, 5);
        assert_eq!(cfg.interval, Duration::from_millis(250));

        let cfg = PollConfig::from_lookup(env(&[
            (ENV_POLL_MAX_ATTEMPTS, "0"),
            (ENV_POLL_INTERVAL_MS, "soon"),
        ]));
        assert_eq!(cfg, PollConfig::default());
    }

    #[test]
    fn gateway_config_requires_url() {
        let err = GatewayConfig::from_lookup(env(&[])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Missing {
                var: ENV_GATEWAY_URL
            }
        ));

        let err = GatewayConfig::from_lookup(env(&[(ENV_GATEWAY_URL, "not a url")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));
    }

    #[test]
    fn gateway_config_reads_optional_values() {
        let cfg = GatewayConfig::from_lookup(env(&[
            (ENV_GATEWAY_URL, "https://pay.example.invalid/"),
            (ENV_HTTP_TIMEOUT_SECONDS, "15"),
            (ENV_USER_AGENT, "mpesa-verify-test"),
            (ENV_CONSUMER_KEY, "key"),
            (ENV_CONSUMER_SECRET, "secret"),
        ]))
        .unwrap();
        assert_eq!(cfg.base_url.as_str(), "https://pay.example.invalid/");
        assert_eq!(cfg.timeout, Some(Duration::from_secs(15)));
        assert_eq!(cfg.user_agent.as_deref(), Some("mpesa-verify-test"));
        assert!(cfg.credentials.is_some());

        let cfg = GatewayConfig::from_lookup(env(&[(ENV_GATEWAY_URL, "https://pay.example.invalid")]))
            .unwrap();
        assert!(cfg.timeout.is_none());
        assert!(cfg.credentials.is_none());
    }

    #[test]
    fn gateway_config_rejects_bad_timeout_and_blank_key() {
        let err = GatewayConfig::from_lookup(env(&[
            (ENV_GATEWAY_URL, "https://pay.example.invalid"),
            (ENV_HTTP_TIMEOUT_SECONDS, "fast"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { .. }));

        let err = GatewayConfig::from_lookup(env(&[
            (ENV_GATEWAY_URL, "https://pay.example.invalid"),
            (ENV_CONSUMER_KEY, "  "),
            (ENV_CONSUMER_SECRET, "secret"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Credentials(_)));
    }
}
