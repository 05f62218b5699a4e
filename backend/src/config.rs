use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?} ({reason})")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime settings of the gateway, read from the environment.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    pub classifier_url: Url,
    pub classifier_timeout: Duration,
    pub max_upload_bytes: usize,
    pub frontend_dir: PathBuf,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let classifier_url = lookup("CLASSIFIER_URL")
            .unwrap_or_else(|| "http://localhost:5001".to_string());
        let classifier_url = parse_classifier_url(&classifier_url)?;

        let frontend_dir = match lookup("FRONTEND_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => match lookup("CARGO_MANIFEST_DIR") {
                Some(manifest_dir) => PathBuf::from(format!("{}/../frontend/dist", manifest_dir)),
                None => PathBuf::from("/usr/src/app/frontend/dist"),
            },
        };

        Ok(Self {
            host: lookup("BIND_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", 8081)?,
            classifier_url,
            classifier_timeout: Duration::from_secs(parse_or(
                &lookup,
                "CLASSIFIER_TIMEOUT_SECS",
                30,
            )?),
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            frontend_dir,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
            value,
        }),
    }
}

fn parse_classifier_url(value: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        name: "CLASSIFIER_URL",
        value: value.to_string(),
        reason,
    };
    let url = Url::parse(value).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<GatewayConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        GatewayConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:8081");
        assert_eq!(config.classifier_url.as_str(), "http://localhost:5001/");
        assert_eq!(config.classifier_timeout, Duration::from_secs(30));
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.frontend_dir, PathBuf::from("/usr/src/app/frontend/dist"));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("BIND_HOST", "127.0.0.1"),
            ("PORT", "9000"),
            ("CLASSIFIER_URL", "https://vision.internal:8443/api"),
            ("CLASSIFIER_TIMEOUT_SECS", "5"),
            ("MAX_UPLOAD_BYTES", "1024"),
            ("CARGO_MANIFEST_DIR", "/src/backend"),
        ])
        .unwrap();
        assert_eq!(config.bind_address(), "127.0.0.1:9000");
        assert_eq!(config.classifier_url.host_str(), Some("vision.internal"));
        assert_eq!(config.classifier_timeout, Duration::from_secs(5));
        assert_eq!(config.max_upload_bytes, 1024);
        assert_eq!(config.frontend_dir, PathBuf::from("/src/backend/../frontend/dist"));

        let explicit = config_from(&[("FRONTEND_DIR", "/srv/www")]).unwrap();
        assert_eq!(explicit.frontend_dir, PathBuf::from("/srv/www"));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = config_from(&[("PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));

        assert!(config_from(&[("CLASSIFIER_URL", "not a url")]).is_err());
        assert!(config_from(&[("CLASSIFIER_URL", "ftp://files.example.com")]).is_err());
        assert!(config_from(&[("MAX_UPLOAD_BYTES", "-1")]).is_err());
    }
}
