use crate::error::{AppError, Result};
use crate::filter::FilterConfig;
use byte_unit::Byte;
use log;
use parse_duration::parse;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_CONFIG_DIR: &str = ".gemctx";
pub const DEFAULT_CONFIG_FILENAME: &str = "gemctx.toml";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TIMEOUT: &str = "60s";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub filters: FiltersConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    #[serde(default = "default_model")]
    pub model: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct FiltersConfig {
    #[serde(default)]
    pub exclude_ext: Vec<String>,
    #[serde(default)]
    pub exclude_name: Vec<String>,
    #[serde(default)]
    pub max_bytes: Option<SizeSetting>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    #[serde(default = "default_key_env")]
    pub key_env: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum SizeSetting {
    Bytes(u64),
    Text(String),
}

impl SizeSetting {
    pub fn to_bytes(&self) -> Result<u64> {
        match self {
            SizeSetting::Bytes(n) => Ok(*n),
            SizeSetting::Text(s) => parse_byte_size(s),
        }
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}
fn default_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}
fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_timeout() -> String {
    DEFAULT_TIMEOUT.to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            key_env: default_key_env(),
            base_url: default_base_url(),
            timeout: default_timeout(),
        }
    }
}

pub fn parse_byte_size(raw: &str) -> Result<u64> {
    let trimmed = raw.trim();
    if let Ok(n) = trimmed.parse::<u64>() {
        return Ok(n);
    }
    let byte = Byte::from_str(trimmed).map_err(|e| {
        AppError::InvalidArgument(format!(
            "Invalid byte size '{}': {}. Use a plain integer or units like KB, MiB.",
            raw, e
        ))
    })?;
    let value: u128 = byte.into();
    u64::try_from(value).map_err(|_| {
        AppError::InvalidArgument(format!("Byte size '{}' is too large.", raw))
    })
}

impl Config {
    pub fn resolve_config_path(
        cwd: &Path,
        cli_config_file: Option<&str>,
        cli_disable_config: bool,
    ) -> Result<Option<PathBuf>> {
        if cli_disable_config {
            log::debug!("Config file loading disabled via CLI flag.");
            return Ok(None);
        }

        if let Some(p_str) = cli_config_file {
            let path = PathBuf::from(shellexpand::tilde(p_str).as_ref());
            if !path.is_file() {
                return Err(AppError::Config(format!(
                    "Specified config file not found at path: {}",
                    path.display()
                )));
            }
            log::debug!("Using specified config file path: {}", path.display());
            return Ok(Some(path));
        }

        let project_path = cwd.join(DEFAULT_CONFIG_DIR).join(DEFAULT_CONFIG_FILENAME);
        if project_path.is_file() {
            log::debug!("Using project config file: {}", project_path.display());
            return Ok(Some(project_path));
        }

        if let Some(user_path) = dirs::config_dir().map(|d| d.join("gemctx").join(DEFAULT_CONFIG_FILENAME)) {
            if user_path.is_file() {
                log::debug!("Using user config file: {}", user_path.display());
                return Ok(Some(user_path));
            }
        }

        log::debug!("No config file found, using defaults.");
        Ok(None)
    }

    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        log::info!("Loading configuration from: {}", config_path.display());
        let toml_content = fs::read_to_string(config_path).map_err(|e| AppError::FileRead {
            path: config_path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&toml_content).map_err(|e| {
            AppError::TomlParse(format!(
                "Error parsing config file '{}': {}. Check TOML syntax and structure.",
                config_path.display(),
                e
            ))
        })
    }

    pub fn from_toml_str(toml_content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str::<Config>(toml_content)
    }

    pub fn load(cwd: &Path, cli_config_file: Option<&str>, cli_disable_config: bool) -> Result<Self> {
        match Self::resolve_config_path(cwd, cli_config_file, cli_disable_config)? {
            Some(path) => Self::load_from_path(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn get_timeout(&self) -> Result<Duration> {
        parse(&self.api.timeout).map_err(|e| {
            AppError::DurationParse(format!(
                "Invalid API timeout '{}': {}. Use format like '30s', '2m'.",
                self.api.timeout, e
            ))
        })
    }

    pub fn get_effective_model(&self, cli_model: Option<&str>) -> String {
        cli_model
            .map(str::to_string)
            .unwrap_or_else(|| self.general.model.clone())
    }

    pub fn build_filter_config(
        &self,
        cli_exclude_ext: &[String],
        cli_exclude_name: &[String],
        cli_max_bytes: Option<u64>,
    ) -> Result<FilterConfig> {
        let max_bytes = match cli_max_bytes {
            Some(n) => Some(n),
            None => self
                .filters
                .max_bytes
                .as_ref()
                .map(SizeSetting::to_bytes)
                .transpose()?,
        };
        Ok(FilterConfig::new(
            self.filters.exclude_ext.iter().chain(cli_exclude_ext),
            self.filters.exclude_name.iter().chain(cli_exclude_name),
            max_bytes,
        ))
    }
}
