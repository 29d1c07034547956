// src/config/mod.rs
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub ml: MlConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Locations of the three pre-trained artifacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MlConfig {
    pub autoencoder_path: PathBuf,
    pub encoder_path: PathBuf,
    pub classifier_path: PathBuf,
}

impl Default for MlConfig {
    fn default() -> Self {
        Self {
            autoencoder_path: PathBuf::from("scae_model.json"),
            encoder_path: PathBuf::from("encoder_model.json"),
            classifier_path: PathBuf::from("model.json"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Loads the config file when one is given, otherwise the built-in
    /// defaults (port 5000 on all interfaces, artifacts in the working dir).
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let mut config: AppConfig = serde_yaml::from_str(content)?;
        config.substitute_env_vars();
        Ok(config)
    }

    // ${VAR} or ${VAR:default}
    fn substitute_env_vars(&mut self) {
        let re = Regex::new(r"\$\{([^:}]+)(?::([^}]*))?\}").expect("static regex");

        let substitute = |s: &str| -> String {
            re.replace_all(s, |caps: &regex::Captures| {
                let var = &caps[1];
                let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
                env::var(var).unwrap_or_else(|_| default.to_string())
            })
            .to_string()
        };

        self.server.host = substitute(&self.server.host);
        self.ml.autoencoder_path = PathBuf::from(substitute(&self.ml.autoencoder_path.to_string_lossy()));
        self.ml.encoder_path = PathBuf::from(substitute(&self.ml.encoder_path.to_string_lossy()));
        self.ml.classifier_path = PathBuf::from(substitute(&self.ml.classifier_path.to_string_lossy()));
        self.observability.log_level = substitute(&self.observability.log_level);
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::InvalidValue("server.host must not be empty".into()));
        }
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue("server.port must not be 0".into()));
        }

        for (key, path) in [
            ("ml.autoencoder_path", &self.ml.autoencoder_path),
            ("ml.encoder_path", &self.ml.encoder_path),
            ("ml.classifier_path", &self.ml.classifier_path),
        ] {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidValue(format!("{key} must not be empty")));
            }
        }

        let level = self.observability.log_level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::InvalidValue(format!(
                "observability.log_level '{}' is not one of {}",
                self.observability.log_level,
                LOG_LEVELS.join(", ")
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_fixed_deployment() {
        let config = AppConfig::load(None).unwrap();
        assert_eq!(config.server.bind_addr(), "0.0.0.0:5000");
        assert_eq!(config.ml.encoder_path, PathBuf::from("encoder_model.json"));
        assert_eq!(config.ml.classifier_path, PathBuf::from("model.json"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = AppConfig::from_yaml("server:\n  port: 8080\n").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn env_substitution_falls_back_to_default() {
        let yaml = "ml:\n  encoder_path: \"${IDS_TEST_UNSET_ENCODER_DIR:/opt/models}/encoder.json\"\n";
        let config = AppConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.ml.encoder_path, PathBuf::from("/opt/models/encoder.json"));
    }

    #[test]
    fn env_substitution_reads_variable() {
        env::set_var("IDS_TEST_LOG_LEVEL", "debug");
        let config = AppConfig::from_yaml("observability:\n  log_level: \"${IDS_TEST_LOG_LEVEL}\"\n").unwrap();
        assert_eq!(config.observability.log_level, "debug");
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.observability.log_level = "loud".into();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.ml.classifier_path = PathBuf::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = AppConfig::load(Some(Path::new("/nonexistent/ids.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
