//! Provider configuration.
//!
//! Each attribute may be given in the provider block or through the
//! environment; the block wins.
//!
//! | Attribute   | Environment          | Default        |
//! |-------------|----------------------|----------------|
//! | `api_token` | `TWINGATE_API_TOKEN` | required       |
//! | `network`   | `TWINGATE_NETWORK`   | required       |
//! | `url`       | `TWINGATE_URL`       | `twingate.com` |

use std::fmt;

use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ProviderError;
use crate::schema::{Attribute, Schema};

/// Environment variable holding the API token.
pub const ENV_API_TOKEN: &str = "TWINGATE_API_TOKEN";
/// Environment variable holding the network slug.
pub const ENV_NETWORK: &str = "TWINGATE_NETWORK";
/// Environment variable holding the base domain.
pub const ENV_URL: &str = "TWINGATE_URL";
/// Base domain used when none is configured.
pub const DEFAULT_URL: &str = "twingate.com";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    api_token: Option<String>,
    network: Option<String>,
    url: Option<String>,
}

/// Resolved provider configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// API token sent as `X-API-KEY`.
    pub api_token: String,
    /// Network slug, the first label of the API host.
    pub network: String,
    /// Base domain of the API host.
    pub url: String,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_token", &"<redacted>")
            .field("network", &self.network)
            .field("url", &self.url)
            .finish()
    }
}

impl ProviderConfig {
    /// Resolve configuration from the provider block and the process environment.
    pub fn from_value(value: &Value) -> Result<Self, ProviderError> {
        Self::resolve(value, |name| std::env::var(name).ok())
    }

    /// Resolve configuration with a custom environment lookup.
    pub fn resolve<F>(value: &Value, env: F) -> Result<Self, ProviderError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = if value.is_null() {
            RawConfig::default()
        } else {
            RawConfig::deserialize(value).map_err(|e| {
                ProviderError::Configuration(format!("invalid provider configuration: {}", e))
            })?
        };

        let pick = |configured: Option<String>, name: &str| {
            non_empty(configured).or_else(|| non_empty(env(name)))
        };

        let api_token = pick(raw.api_token, ENV_API_TOKEN).ok_or_else(|| {
            ProviderError::Configuration(format!(
                "missing api_token, set it in the provider block or {}",
                ENV_API_TOKEN
            ))
        })?;
        let network = pick(raw.network, ENV_NETWORK).ok_or_else(|| {
            ProviderError::Configuration(format!(
                "missing network, set it in the provider block or {}",
                ENV_NETWORK
            ))
        })?;
        let url = pick(raw.url, ENV_URL).unwrap_or_else(|| DEFAULT_URL.to_string());

        Ok(Self {
            api_token,
            network,
            url,
        })
    }

    /// The GraphQL endpoint, `https://<network>.<url>/api/graphql/`.
    pub fn endpoint(&self) -> Result<String, ProviderError> {
        let endpoint = format!("https://{}.{}/api/graphql/", self.network, self.url);
        let parsed = Url::parse(&endpoint).map_err(|e| {
            ProviderError::Configuration(format!("invalid API url '{}': {}", endpoint, e))
        })?;
        if parsed.host_str() != Some(format!("{}.{}", self.network, self.url).as_str()) {
            return Err(ProviderError::Configuration(format!(
                "invalid API url '{}': network and url must form a host name",
                endpoint
            )));
        }
        Ok(endpoint)
    }

    /// Schema of the provider block.
    pub fn schema() -> Schema {
        Schema::v0()
            .with_attribute(
                "api_token",
                Attribute::optional_string()
                    .sensitive()
                    .with_description(format!(
                        "The access key for API operations. Can also be set with {}",
                        ENV_API_TOKEN
                    )),
            )
            .with_attribute(
                "network",
                Attribute::optional_string().with_description(format!(
                    "Your Twingate network ID, as in <network>.twingate.com. Can also be set with {}",
                    ENV_NETWORK
                )),
            )
            .with_attribute(
                "url",
                Attribute::optional_string()
                    .with_default(Value::String(DEFAULT_URL.to_string()))
                    .with_description(format!(
                        "The base domain of the API. Can also be set with {}",
                        ENV_URL
                    )),
            )
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_block_values() {
        let config = ProviderConfig::resolve(
            &json!({"api_token": "tok", "network": "acme"}),
            env(&[]),
        )
        .unwrap();

        assert_eq!(config.api_token, "tok");
        assert_eq!(config.network, "acme");
        assert_eq!(config.url, DEFAULT_URL);
        assert_eq!(
            config.endpoint().unwrap(),
            "https://acme.twingate.com/api/graphql/"
        );
    }

    #[test]
    fn test_environment_fallback() {
        let config = ProviderConfig::resolve(
            &json!({"network": "acme", "api_token": ""}),
            env(&[
                (ENV_API_TOKEN, "from-env"),
                (ENV_NETWORK, "ignored"),
                (ENV_URL, "stg.opstg.com"),
            ]),
        )
        .unwrap();

        assert_eq!(config.api_token, "from-env");
        assert_eq!(config.network, "acme");
        assert_eq!(
            config.endpoint().unwrap(),
            "https://acme.stg.opstg.com/api/graphql/"
        );
    }

    #[test]
    fn test_null_block_uses_environment() {
        let config = ProviderConfig::resolve(
            &Value::Null,
            env(&[(ENV_API_TOKEN, "t"), (ENV_NETWORK, "n")]),
        )
        .unwrap();

        assert_eq!(config.network, "n");
    }

    #[test]
    fn test_missing_token() {
        let err = ProviderConfig::resolve(&json!({"network": "acme"}), env(&[])).unwrap_err();

        assert!(matches!(err, ProviderError::Configuration(_)));
        assert!(err.to_string().contains(ENV_API_TOKEN));
    }

    #[test]
    fn test_missing_network() {
        let err = ProviderConfig::resolve(&json!({"api_token": "t"}), env(&[])).unwrap_err();

        assert!(err.to_string().contains("missing network"));
    }

    #[test]
    fn test_wrong_type_is_configuration_error() {
        let err = ProviderConfig::resolve(&json!({"api_token": 5}), env(&[])).unwrap_err();

        assert!(err.to_string().starts_with("Configuration error: invalid provider configuration"));
    }

    #[test]
    fn test_invalid_endpoint() {
        let config = ProviderConfig {
            api_token: "t".into(),
            network: "bad network".into(),
            url: DEFAULT_URL.into(),
        };

        assert!(matches!(
            config.endpoint(),
            Err(ProviderError::Configuration(_))
        ));

        let config = ProviderConfig {
            network: "acme/evil".into(),
            ..config
        };
        assert!(config.endpoint().is_err());
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = ProviderConfig {
            api_token: "super-secret".into(),
            network: "acme".into(),
            url: DEFAULT_URL.into(),
        };

        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("acme"));
    }

    #[test]
    fn test_schema_marks_token_sensitive() {
        let schema = ProviderConfig::schema();
        assert!(schema.block.attributes["api_token"].flags.sensitive);
        assert!(!schema.block.attributes["network"].flags.required);
    }
}
