use crate::domain::model::UomRules;
use crate::utils::error::{Result, UomError};
use crate::utils::validation::{
    require_at_least, require_non_empty_string, require_path, Validate, ValidationErrors,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_PREFIX: &str = "OKRA";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub validation: ValidationConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Local,
}

impl std::str::FromStr for StoreBackend {
    type Err = UomError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "local" => Ok(Self::Local),
            other => Err(UomError::config(
                "store.backend",
                format!("unsupported backend {:?}; expected memory or local", other),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub collection: String,
    pub data_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            collection: crate::adapters::repository::UOM_COLLECTION.to_string(),
            data_dir: PathBuf::from("./data"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub require_enabled: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            require_enabled: UomRules::default().require_enabled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Loads the TOML file at `path`, falling back to defaults when it does
    /// not exist, then applies `OKRA_*` environment overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut config = match std::fs::read_to_string(path) {
            Ok(content) => {
                let mut config = Self::from_toml_str(&content)?;
                config.resolve_relative_paths(path);
                config
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("Config file {} not found, using defaults", path.display());
                Self::default()
            }
            Err(e) => return Err(UomError::Io(e)),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parses a TOML document after `${VAR}` substitution.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content)
            .map_err(|e| UomError::config("toml_parsing", format!("TOML parsing error: {}", e)))
    }

    /// Replaces `${VAR_NAME}` with the environment value; unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| UomError::config("toml_parsing", e.to_string()))?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// A relative `data_dir` is taken relative to the config file's directory.
    fn resolve_relative_paths(&mut self, config_path: &Path) {
        if self.store.data_dir.is_relative() {
            if let Some(dir) = config_path.parent() {
                if !dir.as_os_str().is_empty() {
                    self.store.data_dir = dir.join(&self.store.data_dir);
                }
            }
        }
    }

    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}_{}", ENV_PREFIX, name));

        if let Some(host) = var("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("SERVER_PORT") {
            self.server.port = port.trim().parse().map_err(|_| {
                UomError::config("server.port", format!("invalid port {:?}", port))
            })?;
        }
        if let Some(backend) = var("STORE_BACKEND") {
            self.store.backend = backend.parse()?;
        }
        if let Some(collection) = var("STORE_COLLECTION") {
            self.store.collection = collection;
        }
        if let Some(data_dir) = var("STORE_DATA_DIR") {
            self.store.data_dir = PathBuf::from(data_dir);
        }
        if let Some(level) = var("LOG_LEVEL") {
            self.logging.level = level;
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_seconds)
    }

    pub fn uom_rules(&self) -> UomRules {
        UomRules {
            require_enabled: self.validation.require_enabled,
        }
    }

    pub fn validate_config(&self) -> std::result::Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require_non_empty_string(&mut errors, "server.host", &self.server.host);
        require_at_least(&mut errors, "server.port", self.server.port, 1);
        require_at_least(
            &mut errors,
            "server.request_timeout_seconds",
            self.server.request_timeout_seconds,
            1,
        );
        require_non_empty_string(&mut errors, "store.collection", &self.store.collection);
        if self.store.backend == StoreBackend::Local {
            require_path(
                &mut errors,
                "store.data_dir",
                &self.store.data_dir.to_string_lossy(),
            );
        }
        errors.into_result()
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
            .map_err(|errors| UomError::config("config", errors.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_when_sections_missing() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.uom_rules().require_enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[server]
host = "127.0.0.1"
port = 9090
request_timeout_seconds = 5

[store]
backend = "local"
collection = "units"
data_dir = "/var/lib/okra"

[validation]
require_enabled = false

[logging]
level = "debug"
json = true
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.bind_address(), "127.0.0.1:9090");
        assert_eq!(config.store.backend, StoreBackend::Local);
        assert_eq!(config.store.collection, "units");
        assert!(!config.uom_rules().require_enabled);
        assert!(config.logging.json);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("OKRA_TEST_COLLECTION", "measures");

        let toml_content = r#"
[store]
collection = "${OKRA_TEST_COLLECTION}"
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.store.collection, "measures");

        std::env::remove_var("OKRA_TEST_COLLECTION");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("OKRA_SERVER_PORT", "7000"),
            ("OKRA_STORE_BACKEND", "local"),
            ("OKRA_STORE_DATA_DIR", "/srv/uoms"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config
            .apply_env_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.server.port, 7000);
        assert_eq!(config.store.backend, StoreBackend::Local);
        assert_eq!(config.store.data_dir, PathBuf::from("/srv/uoms"));

        let bad_port = |key: &str| (key == "OKRA_SERVER_PORT").then(|| "eighty".to_string());
        assert!(AppConfig::default().apply_env_overrides(bad_port).is_err());
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[server]
port = 0
request_timeout_seconds = 0

[store]
collection = ""
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();
        let errors = config.validate_config().unwrap_err();
        assert!(errors.contains_field("server.port"));
        assert!(errors.contains_field("server.request_timeout_seconds"));
        assert!(errors.contains_field("store.collection"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_toml_is_error() {
        assert!(AppConfig::from_toml_str("[server\nport = ").is_err());
        assert!(AppConfig::from_toml_str("[store]\nbackend = \"firestore\"").is_err());
    }

    #[test]
    fn test_config_from_file_resolves_data_dir() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[store]\nbackend = \"local\"\ndata_dir = \"data\"\n")
            .unwrap();

        let config = AppConfig::load(temp_file.path()).unwrap();
        let expected = temp_file.path().parent().unwrap().join("data");
        assert_eq!(config.store.data_dir, expected);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.server, ServerConfig::default());
    }
}
