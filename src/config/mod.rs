//! Configuration for the live-results pipeline, read from a JSON file.
//!
//! Every section is optional; missing fields take the defaults below. See `conf/default.json`.
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    model::Locale,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub turnout: TurnoutConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub locale: Locale,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api".to_string(),
            request_timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct PollingConfig {
    pub interval_ms: u64,
    /// start polling as soon as the view opens
    pub auto_refresh: bool,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 10_000,
            auto_refresh: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct TurnoutConfig {
    /// baseline denominator for the turnout gauge
    pub expected_voters: u64,
}

impl Default for TurnoutConfig {
    fn default() -> Self {
        Self {
            expected_voters: 50_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct AnimationConfig {
    pub duration_ms: u64,
    pub steps: u32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            duration_ms: 1_500,
            steps: 60,
        }
    }
}

impl Config {
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let c = tokio::fs::read_to_string(path).await?;
        Self::parse(&c)
    }

    pub fn parse(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// # Error
    /// Returns [`Error::InvalidConfig`] for a zero poll interval, zero animation steps or an empty base url
    pub fn validate(&self) -> Result<()> {
        if self.polling.interval_ms == 0 {
            return Err(Error::InvalidConfig {
                reason: "polling.interval_ms must be greater than 0".to_string(),
            });
        }

        if self.animation.steps == 0 {
            return Err(Error::InvalidConfig {
                reason: "animation.steps must be greater than 0".to_string(),
            });
        }

        if self.api.base_url.trim().is_empty() {
            return Err(Error::InvalidConfig {
                reason: "api.base_url must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::{error::Error, model::Locale};

    use super::{AnimationConfig, ApiConfig, Config, PollingConfig, TurnoutConfig};

    #[tokio::test]
    async fn deserialize_default_file() {
        let mut config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        config_path.push("conf/default.json");

        let config = Config::from_path(config_path).await.unwrap();
        assert_eq!(config, Config::default());
    }

    #[tokio::test]
    async fn deserialize_partial_file() {
        let mut config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        config_path.push("conf/fast_poll_hi.json");

        let config = Config::from_path(config_path).await.unwrap();
        assert!(matches!(
            config,
            Config {
                api: ApiConfig {
                    request_timeout_ms: 10_000,
                    ..
                },
                polling: PollingConfig {
                    interval_ms: 2_000,
                    auto_refresh: true,
                },
                turnout: TurnoutConfig {
                    expected_voters: 50_000,
                },
                animation: AnimationConfig {
                    duration_ms: 1_500,
                    steps: 60,
                },
                locale: Locale::Hi,
            }
        ));
        assert_eq!(config.api.base_url, "http://127.0.0.1:3000/api");
    }

    #[test]
    fn empty_object_is_all_defaults() {
        assert_eq!(Config::parse("{}").unwrap(), Config::default());
    }

    #[test]
    fn zero_interval_is_rejected() {
        let err = Config::parse(r#"{ "polling": { "interval_ms": 0 } }"#)
            .err()
            .unwrap();
        match err {
            Error::InvalidConfig { reason } => assert!(reason.contains("interval_ms")),
            _ => panic!("Unexpected err {}", err),
        }
    }

    #[test]
    fn zero_steps_is_rejected() {
        let err = Config::parse(r#"{ "animation": { "steps": 0 } }"#)
            .err()
            .unwrap();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn zero_expected_voters_is_allowed() {
        let config = Config::parse(r#"{ "turnout": { "expected_voters": 0 } }"#).unwrap();
        assert_eq!(config.turnout.expected_voters, 0);
    }

    #[test]
    fn unknown_locale_is_rejected() {
        assert!(Config::parse(r#"{ "locale": "fr" }"#).is_err());
    }
}
