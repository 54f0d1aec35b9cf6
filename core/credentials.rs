use crate::error::{AppError, Result};
use log;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(raw: impl Into<String>) -> Result<Self> {
        let key = raw.into().trim().to_string();
        if key.is_empty() {
            return Err(AppError::Authentication("API key is empty.".to_string()));
        }
        Ok(Self(key))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

pub fn default_env_files() -> Vec<PathBuf> {
    let mut files = Vec::new();
    if let Some(exe_dir) = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        files.push(exe_dir.join(".env"));
    }
    if let Ok(cwd) = env::current_dir() {
        let cwd_env = cwd.join(".env");
        if !files.contains(&cwd_env) {
            files.push(cwd_env);
        }
    }
    files
}

pub fn resolve_api_key(key_env: &str, env_files: &[PathBuf]) -> Result<ApiKey> {
    resolve_api_key_from(env::var(key_env).ok(), key_env, env_files)
}

pub fn resolve_api_key_from(
    env_value: Option<String>,
    key_env: &str,
    env_files: &[PathBuf],
) -> Result<ApiKey> {
    if let Some(value) = env_value.filter(|v| !v.trim().is_empty()) {
        log::debug!("Using {} from the process environment", key_env);
        return ApiKey::new(value);
    }

    for env_file in env_files {
        if !env_file.is_file() {
            continue;
        }
        log::debug!("Looking for {} in {}", key_env, env_file.display());
        let entries = match dotenvy::from_path_iter(env_file) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Could not open {}: {}", env_file.display(), e);
                continue;
            }
        };
        for item in entries {
            let (name, value) = match item {
                Ok(pair) => pair,
                Err(e) => {
                    log::warn!("Skipping malformed line in {}: {}", env_file.display(), e);
                    continue;
                }
            };
            if name == key_env && !value.trim().is_empty() {
                log::debug!("Using {} from {}", key_env, env_file.display());
                return ApiKey::new(value);
            }
        }
    }

    Err(AppError::Authentication(format!(
        "{} environment variable not set (also checked: {}).",
        key_env,
        if env_files.is_empty() {
            "no .env files".to_string()
        } else {
            env_files
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        }
    )))
}
