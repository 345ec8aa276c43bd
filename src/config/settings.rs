use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ClientError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub instance: InstanceConfig,
    pub http: HttpConfig,
    pub indexing: IndexingConfig,
    pub secrets: SecretsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstanceConfig {
    /// Subdomain of the Glean deployment, e.g. `support-lab`.
    pub name: String,
    /// Replaces the derived `https://<name>-be.glean.com` when set.
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HttpConfig {
    pub connect_timeout_secs: u64,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexingConfig {
    pub datasource: Option<String>,
    pub object_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SecretsConfig {
    /// Explicit `.env` files; empty means search `./.env`, `../.env`, `../../.env`.
    pub env_files: Vec<PathBuf>,
    /// JSON object file acting as the session secret store.
    pub secret_store: Option<PathBuf>,
}

pub const ENV_INSTANCE: &str = "GLEAN_INSTANCE";
pub const ENV_BASE_URL: &str = "GLEAN_BASE_URL";
pub const ENV_DATASOURCE: &str = "GLEAN_DATASOURCE";
pub const ENV_TIMEOUT_SECS: &str = "GLEAN_TIMEOUT_SECS";

impl Default for Config {
    fn default() -> Self {
        Self {
            instance: InstanceConfig {
                name: "support-lab".to_string(),
                base_url: None,
            },
            http: HttpConfig {
                connect_timeout_secs: 10,
                timeout_secs: 30,
            },
            indexing: IndexingConfig {
                datasource: None,
                object_type: "Article".to_string(),
            },
            secrets: SecretsConfig {
                env_files: Vec::new(),
                secret_store: None,
            },
        }
    }
}

impl Config {
    /// Loads defaults, then `~/.glean-lab/config.json` if present, then
    /// environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::default_config_path()?;
        Self::load_from(Some(&path))
    }

    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, |key| std::env::var(key).ok())
    }

    /// Layered load with an injectable environment lookup.
    pub fn load_with_env<F>(path: Option<&Path>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Self::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }

        builder = builder
            .set_override_option("instance.name", env(ENV_INSTANCE))?
            .set_override_option("instance.base_url", env(ENV_BASE_URL))?
            .set_override_option("indexing.datasource", env(ENV_DATASOURCE))?
            .set_override_option("http.timeout_secs", env(ENV_TIMEOUT_SECS))?;

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        match &self.instance.base_url {
            Some(url) => {
                let url = url.trim();
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(ClientError::invalid_input(format!(
                        "base URL must start with http:// or https:// (got '{url}')"
                    )));
                }
                if url.trim_end_matches('/').ends_with(':') || url.ends_with("//") {
                    return Err(ClientError::invalid_input(format!(
                        "base URL has no host: '{url}'"
                    )));
                }
            }
            None => {
                let name = self.instance.name.trim();
                if name.is_empty() {
                    return Err(ClientError::invalid_input(
                        "instance name cannot be empty (set GLEAN_INSTANCE)",
                    ));
                }
                if !is_subdomain_label(name) {
                    return Err(ClientError::invalid_input(format!(
                        "instance name '{name}' is not a valid subdomain \
                         (letters, digits and '-', at most 60 characters)"
                    )));
                }
            }
        }
        if self.http.connect_timeout_secs == 0 || self.http.timeout_secs == 0 {
            return Err(ClientError::invalid_input("timeouts must be greater than zero"));
        }
        Ok(())
    }

    /// Root URL for every API path, without a trailing slash.
    pub fn base_url(&self) -> String {
        match &self.instance.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}-be.glean.com", self.instance.name.trim()),
        }
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, json)?;

        Ok(())
    }

    fn default_config_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| {
            ClientError::Config(config::ConfigError::Message(
                "Could not determine home directory".to_string(),
            ))
        })?;

        Ok(home.join(".glean-lab").join("config.json"))
    }
}

/// The derived URL is `https://<name>-be.glean.com`, so the name must be one DNS label.
fn is_subdomain_label(name: &str) -> bool {
    (1..=60).contains(&name.len())
        && !name.starts_with('-')
        && !name.ends_with('-')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults_derive_instance_url() {
        let config = Config::load_with_env(None, no_env).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.base_url(), "https://support-lab-be.glean.com");
    }

    #[test]
    fn test_base_url_override_strips_trailing_slash() {
        let mut config = Config::default();
        config.instance.base_url = Some("http://127.0.0.1:8080/".to_string());
        assert_eq!(config.base_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_file_then_env_layering() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        let mut on_disk = Config::default();
        on_disk.instance.name = "acme".to_string();
        on_disk.indexing.datasource = Some("filedocs".to_string());
        on_disk.save_to(&path).unwrap();

        let env: HashMap<&str, &str> = [(ENV_DATASOURCE, "labdocs"), (ENV_TIMEOUT_SECS, "45")]
            .into_iter()
            .collect();
        let config =
            Config::load_with_env(Some(&path), |k| env.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(config.instance.name, "acme");
        assert_eq!(config.indexing.datasource.as_deref(), Some("labdocs"));
        assert_eq!(config.http.timeout_secs, 45);
        assert_eq!(config.http.connect_timeout_secs, 10);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("absent.json");
        let config = Config::load_with_env(Some(&path), no_env).unwrap();
        assert_eq!(config.instance.name, "support-lab");
    }

    #[test]
    fn test_empty_instance_rejected() {
        let result = Config::load_with_env(None, |k| {
            (k == ENV_INSTANCE).then(|| "  ".to_string())
        });
        assert!(matches!(result, Err(ClientError::InvalidInput { .. })));
    }

    #[test]
    fn test_instance_must_be_a_subdomain_label() {
        let too_long = "a".repeat(61);
        for bad in ["bad_name!", "lab.example", "-lab", "evil.com/x?", too_long.as_str()] {
            let result =
                Config::load_with_env(None, |k| (k == ENV_INSTANCE).then(|| bad.to_string()));
            assert!(
                matches!(result, Err(ClientError::InvalidInput { .. })),
                "{bad} should be rejected"
            );
        }

        let config =
            Config::load_with_env(None, |k| (k == ENV_INSTANCE).then(|| "acme-2".to_string()))
                .unwrap();
        assert_eq!(config.base_url(), "https://acme-2-be.glean.com");
    }

    #[test]
    fn test_base_url_must_be_http() {
        for bad in ["ftp://x", "127.0.0.1:8080", "https://", "http:///"] {
            let result =
                Config::load_with_env(None, |k| (k == ENV_BASE_URL).then(|| bad.to_string()));
            assert!(
                matches!(result, Err(ClientError::InvalidInput { .. })),
                "{bad} should be rejected"
            );
        }

        let mut config = Config::default();
        config.instance.base_url = Some(String::new());
        assert!(matches!(
            config.validate(),
            Err(ClientError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_base_url_bypasses_instance_name_check() {
        let mut config = Config::default();
        config.instance.name = String::new();
        config.instance.base_url = Some("https://glean.internal.example:8443/".to_string());
        config.validate().unwrap();
        assert_eq!(config.base_url(), "https://glean.internal.example:8443");
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = Config::default();
        config.http.timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
