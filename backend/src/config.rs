use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use shared::ApiConfig;
use shared::service::{DEFAULT_API_URL, DEFAULT_BATCH_DELAY_MS, DEFAULT_RANDOM_BATCH_SIZE};
use thiserror::Error;
use url::Url;

pub const DEFAULT_PORT: u16 = 8081;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
    #[error("invalid prediction service URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Effective runtime settings: `.env`, then the process environment, then CLI flags.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api: ApiConfig,
    pub port: u16,
    pub frontend_dir: PathBuf,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("PARKINI_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let mut api = ApiConfig::new(validate_url(&base_url)?);
        api.batch_delay_ms = parse("BATCH_DELAY_MS", lookup("BATCH_DELAY_MS"), DEFAULT_BATCH_DELAY_MS)?;
        api.random_batch_size =
            parse("RANDOM_BATCH_SIZE", lookup("RANDOM_BATCH_SIZE"), DEFAULT_RANDOM_BATCH_SIZE)?;

        let frontend_dir = lookup("FRONTEND_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_frontend_dir);

        Ok(Self {
            api,
            port: parse("PORT", lookup("PORT"), DEFAULT_PORT)?,
            frontend_dir,
        })
    }

    pub fn with_api_url(mut self, url: Option<String>) -> Result<Self, ConfigError> {
        if let Some(url) = url {
            self.api.base_url = validate_url(&url)?;
        }
        Ok(self)
    }
}

fn default_frontend_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../frontend/dist")
}

fn parse<T: FromStr>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

/// Only http(s) origins are accepted; the trailing slash is dropped.
fn validate_url(raw: &str) -> Result<String, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme {}", url.scheme()),
        });
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Settings::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let settings = settings(&[]).unwrap();
        assert_eq!(settings.api.base_url, "http://localhost:5000");
        assert_eq!(settings.api.batch_delay_ms, 500);
        assert_eq!(settings.api.random_batch_size, 5);
        assert_eq!(settings.port, 8081);
        assert!(settings.frontend_dir.ends_with("frontend/dist"));
    }

    #[test]
    fn environment_overrides_defaults() {
        let settings = settings(&[
            ("PARKINI_API_URL", "https://parking.example.com/"),
            ("PORT", "9000"),
            ("BATCH_DELAY_MS", "0"),
            ("RANDOM_BATCH_SIZE", "12"),
            ("FRONTEND_DIR", "/srv/dist"),
        ])
        .unwrap();
        assert_eq!(settings.api.base_url, "https://parking.example.com");
        assert_eq!(settings.port, 9000);
        assert_eq!(settings.api.batch_delay_ms, 0);
        assert_eq!(settings.api.random_batch_size, 12);
        assert_eq!(settings.frontend_dir, PathBuf::from("/srv/dist"));
    }

    #[test]
    fn rejects_bad_values() {
        assert_eq!(
            settings(&[("PORT", "eighty")]),
            Err(ConfigError::Invalid { name: "PORT", value: "eighty".into() })
        );
        assert!(matches!(
            settings(&[("PARKINI_API_URL", "ftp://models")]),
            Err(ConfigError::InvalidUrl { .. })
        ));
        assert!(matches!(
            settings(&[("PARKINI_API_URL", "not a url")]),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn cli_url_wins_over_environment() {
        let settings = settings(&[("PARKINI_API_URL", "http://a:5000")])
            .and_then(|s| s.with_api_url(Some("http://b:6000".into())))
            .unwrap();
        assert_eq!(settings.api.base_url, "http://b:6000");
    }
}
