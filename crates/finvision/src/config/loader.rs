use std::path::{Path, PathBuf};

use crate::config::schema::Config;
use crate::error::ConfigError;

/// Returns the default config location: `~/.finvision/config.json`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".finvision").join("config.json"))
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_json::from_str(content)?;

    validate_config(&config)?;

    Ok(config)
}

/// Loads the config from an explicit path, or from the default location if
/// a file exists there, or falls back to built-in defaults.
pub fn load_config_or_default(path: Option<&Path>) -> Result<Config, ConfigError> {
    if let Some(path) = path {
        return load_config(path);
    }

    match default_config_path() {
        Some(default_path) if default_path.exists() => {
            log::debug!("Loading config from {}", default_path.display());
            load_config(default_path)
        }
        _ => {
            log::debug!("No config file found, using defaults");
            Ok(Config::default())
        }
    }
}

pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    let extraction = &config.extraction;
    if extraction.model.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "extraction.model must not be empty".to_string(),
        });
    }

    if !extraction.endpoint.starts_with("http://") && !extraction.endpoint.starts_with("https://")
    {
        return Err(ConfigError::Validation {
            message: format!(
                "extraction.endpoint must be an http(s) URL, got '{}'",
                extraction.endpoint
            ),
        });
    }

    if extraction.timeout_secs == 0 || extraction.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation {
            message: "extraction timeouts must be greater than zero".to_string(),
        });
    }

    if config.queue.event_capacity == 0 {
        return Err(ConfigError::Validation {
            message: "queue.eventCapacity must be greater than zero".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_minimal_config() {
        let config = load_config_from_str(r#"{ "version": "1.0" }"#).unwrap();
        assert_eq!(config.version, "1.0");
    }

    #[test]
    fn test_unsupported_version() {
        let err = load_config_from_str(r#"{ "version": "2.0" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
        assert!(err.to_string().contains("Unsupported config version"));
    }

    #[test]
    fn test_invalid_json() {
        let err = load_config_from_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::ParseJson(_)));
    }

    #[test]
    fn test_rejects_non_http_endpoint() {
        let err =
            load_config_from_str(r#"{ "extraction": { "endpoint": "ftp://example.com" } }"#)
                .unwrap_err();
        assert!(err.to_string().contains("extraction.endpoint"));
    }

    #[test]
    fn test_rejects_zero_timeout_and_capacity() {
        assert!(load_config_from_str(r#"{ "extraction": { "timeoutSecs": 0 } }"#).is_err());
        assert!(load_config_from_str(r#"{ "queue": { "eventCapacity": 0 } }"#).is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "inMemory": true }}"#).unwrap();

        let config = load_config(file.path()).unwrap();
        assert!(config.in_memory);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config("/nonexistent/finvision.json").unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }

    #[test]
    fn test_explicit_path_is_required_to_exist() {
        let result = load_config_or_default(Some(Path::new("/nonexistent/finvision.json")));
        assert!(result.is_err());
    }
}
