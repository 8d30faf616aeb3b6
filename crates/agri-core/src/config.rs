//! Server configuration.
//!
//! Precedence (lowest first): built-in defaults, TOML file (`AGRI_CONFIG` or
//! `config/agri.toml`), `AGRI__*` environment, then the plain variables below.
//!
//! | Env | Default | Description |
//! |-----|---------|-------------|
//! | DEBUG | true | "true" (any case) enables debug mode; anything else disables it. |
//! | HOST | 0.0.0.0 | Bind address. |
//! | PORT | 5000 | Bind port. |
//! | LOGGING_LEVEL | INFO | Log filter (`INFO`, `debug`, or a full `EnvFilter` directive). |

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_PATH: &str = "config/agri.toml";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// File name of the API log inside `logs_dir`.
pub const LOG_FILE_NAME: &str = "api.log";

fn default_max_upload_bytes() -> usize {
    DEFAULT_MAX_UPLOAD_BYTES
}

/// Global server configuration. Load with [`ServerConfig::load`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub debug: bool,
    pub host: String,
    pub port: u16,
    pub logging_level: String,
    /// Upper bound for request bodies (image uploads).
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    #[serde(default)]
    pub paths: DataPaths,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            debug: true,
            host: "0.0.0.0".to_string(),
            port: 5000,
            logging_level: "INFO".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            paths: DataPaths::default(),
        }
    }
}

/// Locations of model artifacts and reference data. Relative file names are
/// resolved against `models_dir` / `data_dir`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataPaths {
    pub models_dir: PathBuf,
    pub data_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub crop_model: PathBuf,
    pub crop_scaler: PathBuf,
    pub disease_model: PathBuf,
    pub yield_model: PathBuf,
    pub yield_preprocessor: PathBuf,
    pub fertilizer_table: PathBuf,
    pub disease_knowledge_base: PathBuf,
    /// Optional JSON object of extra label aliases, merged over the built-in table.
    pub label_aliases: Option<PathBuf>,
}

impl Default for DataPaths {
    fn default() -> Self {
        Self {
            models_dir: PathBuf::from("ml-models"),
            data_dir: PathBuf::from("data"),
            logs_dir: PathBuf::from("logs"),
            crop_model: PathBuf::from("crop_recommendation_model.onnx"),
            crop_scaler: PathBuf::from("crop_scaler.json"),
            disease_model: PathBuf::from("trained_model.onnx"),
            yield_model: PathBuf::from("dtr.onnx"),
            yield_preprocessor: PathBuf::from("yield_preprocessor.json"),
            fertilizer_table: PathBuf::from("fertilizer.csv"),
            disease_knowledge_base: PathBuf::from("plant_disease_updated.json"),
            label_aliases: None,
        }
    }
}

impl DataPaths {
    pub fn model(&self, file: &Path) -> PathBuf {
        resolve(&self.models_dir, file)
    }

    pub fn data(&self, file: &Path) -> PathBuf {
        resolve(&self.data_dir, file)
    }

    pub fn log_file(&self) -> PathBuf {
        self.logs_dir.join(LOG_FILE_NAME)
    }
}

fn resolve(dir: &Path, file: &Path) -> PathBuf {
    if file.is_absolute() {
        file.to_path_buf()
    } else {
        dir.join(file)
    }
}

impl ServerConfig {
    /// Load from file and environment (see module docs for precedence).
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("AGRI_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let built = Self::builder(Path::new(&config_path))?
            .add_source(config::Environment::with_prefix("AGRI").separator("__"))
            .set_override_option("debug", std::env::var("DEBUG").ok().map(|v| env_flag(&v)))?
            .set_override_option("host", env_opt_string("HOST"))?
            .set_override_option("port", env_opt_string("PORT"))?
            .set_override_option("logging_level", env_opt_string("LOGGING_LEVEL"))?
            .build()?;

        built.try_deserialize()
    }

    /// Defaults plus the given TOML file only; no environment lookups.
    pub fn from_file(path: &Path) -> Result<Self, config::ConfigError> {
        Self::builder(path)?.build()?.try_deserialize()
    }

    fn builder(
        path: &Path,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        let defaults = ServerConfig::default();
        let builder = config::Config::builder()
            .set_default("debug", defaults.debug)?
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("logging_level", defaults.logging_level)?
            .set_default("max_upload_bytes", defaults.max_upload_bytes as i64)?;

        Ok(if path.exists() {
            builder.add_source(config::File::from(path))
        } else {
            builder
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Only "true" (any case) enables.
fn env_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

fn env_opt_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
