//! Chargement et validation de la configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use lotofacil_engine::report::ReportSettings;
use lotofacil_engine::trained::ModelConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Lecture du fichier de configuration impossible : {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Configuration illisible : {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Configuration invalide : {0}")]
    ValidationError(String),
}

/// API distante qui reçoit le rapport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: None,
            email: None,
            password: None,
            timeout_seconds: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_companion_limit")]
    pub companion_limit: usize,

    #[serde(default = "default_heuristic_count")]
    pub heuristic_count: usize,

    #[serde(default = "default_model_seed")]
    pub model_seed: u64,

    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,

    #[serde(default = "default_knn_k")]
    pub knn_k: usize,

    #[serde(default = "default_max_predictions")]
    pub max_predictions: usize,
}

fn default_companion_limit() -> usize {
    15
}

fn default_heuristic_count() -> usize {
    10
}

fn default_model_seed() -> u64 {
    42
}

fn default_test_fraction() -> f64 {
    0.2
}

fn default_knn_k() -> usize {
    3
}

fn default_max_predictions() -> usize {
    5
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            companion_limit: default_companion_limit(),
            heuristic_count: default_heuristic_count(),
            model_seed: default_model_seed(),
            test_fraction: default_test_fraction(),
            knn_k: default_knn_k(),
            max_predictions: default_max_predictions(),
        }
    }
}

impl AnalysisConfig {
    pub fn settings(&self) -> ReportSettings {
        ReportSettings {
            companion_limit: self.companion_limit,
            heuristic_count: self.heuristic_count,
            model: ModelConfig {
                test_fraction: self.test_fraction,
                seed: self.model_seed,
                knn_k: self.knn_k,
                max_predictions: self.max_predictions,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub analysis: AnalysisConfig,
}

fn default_db_path() -> PathBuf {
    lotofacil_db::db::db_path()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            log_level: default_log_level(),
            api: ApiConfig::default(),
            analysis: AnalysisConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Fichier (s'il existe), puis variables d'environnement, puis validation.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("API_URL") {
            self.api.url = Some(url);
        }
        if let Some(email) = lookup("API_EMAIL") {
            self.api.email = Some(email);
        }
        if let Some(password) = lookup("API_PASSWORD") {
            self.api.password = Some(password);
        }
        if let Some(path) = lookup("LOTOFACIL_DB") {
            self.db_path = PathBuf::from(path);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "api.timeout_seconds doit être supérieur à 0".to_string(),
            ));
        }

        let fraction = self.analysis.test_fraction;
        if !(fraction > 0.0 && fraction < 1.0) {
            return Err(ConfigError::ValidationError(format!(
                "analysis.test_fraction doit être dans ]0, 1[ (reçu {})",
                fraction
            )));
        }

        if self.analysis.knn_k == 0 {
            return Err(ConfigError::ValidationError(
                "analysis.knn_k doit être supérieur à 0".to_string(),
            ));
        }

        Ok(())
    }
}
