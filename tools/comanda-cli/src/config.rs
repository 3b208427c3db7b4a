//! CLI configuration.

use anyhow::{Context, Result};
use comanda_observability::LoggingSettings;
use comanda_store::ConnectionConfig;
use serde::{Deserialize, Serialize};

/// CLI configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CliConfig {
    /// Store connection.
    #[serde(default)]
    pub store: ConnectionConfig,

    /// Log level and format.
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Values used when a command leaves them out.
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        if path.ends_with(".json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }

    /// Save config to a file.
    pub fn save(&self, path: &str) -> Result<()> {
        let content = if path.ends_with(".json") {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self)?
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path))
    }

    /// Config pointing at a JSON store next to the config file.
    pub fn for_store(store_path: &str) -> Self {
        Self {
            store: ConnectionConfig {
                create_if_missing: true,
                ..ConnectionConfig::file(store_path)
            },
            ..Self::default()
        }
    }
}

/// Defaults applied to order commands.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DefaultsConfig {
    /// Overrides the messaging destination from the store settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,

    /// Payment method when `--payment` is not given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,

    /// Table for dine-in orders when `--table` is not given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
}

/// Generate a default comanda.toml config file.
pub fn generate_default_config(store_path: &str) -> String {
    format!(
        r#"# Comanda configuration

[store]
path = "{store_path}"
create_if_missing = true
poll_interval_secs = 30
fetch_retries = 2

[logging]
level = "info"
format = "human"

[defaults]
# destination = "+15550100"
payment_method = "Cash"
# table = "T1"
"#,
        store_path = store_path
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_config_parses() {
        let config: CliConfig = toml::from_str(&generate_default_config("store.json")).unwrap();
        assert_eq!(
            config.store.path.as_deref(),
            Some(std::path::Path::new("store.json"))
        );
        assert!(config.store.create_if_missing);
        assert_eq!(config.defaults.payment_method.as_deref(), Some("Cash"));
        assert_eq!(config.defaults.table, None);
    }

    #[test]
    fn test_save_and_load_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("comanda.json");
        let path = path.to_str().unwrap();

        let mut config = CliConfig::for_store("data/store.json");
        config.defaults.table = Some("T4".into());
        config.save(path).unwrap();

        assert_eq!(CliConfig::load(path).unwrap(), config);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: CliConfig = toml::from_str("").unwrap();
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.store.path, None);
    }
}
