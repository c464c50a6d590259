use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: String,
    /// SQLite file for durable records. Defaults to `~/.finvision/data/finvision.db`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<String>,
    /// Keep records in memory only, even if the database could be opened.
    #[serde(default)]
    pub in_memory: bool,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub queue: QueueConfig,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            database_path: None,
            in_memory: false,
            extraction: ExtractionConfig::default(),
            queue: QueueConfig::default(),
        }
    }
}

impl Config {
    /// Effective database path with `~` expanded, or `None` when no home
    /// directory is known and no path is configured.
    pub fn resolved_database_path(&self) -> Option<PathBuf> {
        match &self.database_path {
            Some(path) => Some(expand_home(path)),
            None => crate::db::default_database_path(),
        }
    }
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Settings for the document extraction service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionConfig {
    /// Model name used in the `generateContent` call.
    #[serde(default = "default_model")]
    pub model: String,
    /// Base URL of the generative language API.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_file: Option<String>,
    #[serde(default = "default_api_key_env_var")]
    pub api_key_env_var: String,
    /// Whole-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Display name of the acting user, included in the extraction prompt.
    #[serde(default = "default_user_name")]
    pub user_name: String,
}

fn default_model() -> String {
    "gemini-3-flash-preview".to_string()
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_api_key_env_var() -> String {
    "API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_user_name() -> String {
    "Business Owner".to_string()
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            endpoint: default_endpoint(),
            api_key: None,
            api_key_file: None,
            api_key_env_var: default_api_key_env_var(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            user_name: default_user_name(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueConfig {
    /// Capacity of the queue event broadcast channel.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_event_capacity() -> usize {
    256
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            event_capacity: default_event_capacity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.version, "1.0");
        assert!(!config.in_memory);
        assert_eq!(config.extraction.model, "gemini-3-flash-preview");
        assert_eq!(config.extraction.api_key_env_var, "API_KEY");
        assert_eq!(config.queue.event_capacity, 256);
    }

    #[test]
    fn test_empty_object_uses_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.extraction.timeout_secs, 60);
        assert_eq!(config.extraction.user_name, "Business Owner");
    }

    #[test]
    fn test_camel_case_keys() {
        let config: Config = serde_json::from_str(
            r#"{
                "databasePath": "/tmp/fv.db",
                "inMemory": true,
                "extraction": { "apiKeyEnvVar": "GEMINI_KEY", "timeoutSecs": 5 },
                "queue": { "eventCapacity": 8 }
            }"#,
        )
        .unwrap();

        assert_eq!(config.database_path.as_deref(), Some("/tmp/fv.db"));
        assert!(config.in_memory);
        assert_eq!(config.extraction.api_key_env_var, "GEMINI_KEY");
        assert_eq!(config.extraction.timeout_secs, 5);
        assert_eq!(config.queue.event_capacity, 8);
    }

    #[test]
    fn test_api_key_never_serialized() {
        let mut config = Config::default();
        config.extraction.api_key = Some("secret".to_string());

        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
    }

    #[test]
    fn test_resolved_database_path() {
        let mut config = Config::default();
        assert!(config
            .resolved_database_path()
            .unwrap()
            .ends_with("finvision.db"));

        config.database_path = Some("/var/lib/finvision/records.db".to_string());
        assert_eq!(
            config.resolved_database_path(),
            Some(PathBuf::from("/var/lib/finvision/records.db"))
        );

        config.database_path = Some("~/fv.db".to_string());
        let resolved = config.resolved_database_path().unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("fv.db"));
    }
}
