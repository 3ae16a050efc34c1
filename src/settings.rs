use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{OnceLock, RwLock};

use crate::error::AppError;
use crate::services::token_store::DEFAULT_TIMEOUT_SECS;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";
pub const DEFAULT_HELP_URL: &str = "https://holmes.bukeshiguang.com/";

/// Overrides the directory holding `settings.json`.
pub const CONFIG_DIR_ENV: &str = "OPENKEY_CONFIG_DIR";

/// Client settings persisted in `~/.openkey/settings.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,
    /// API key of the signed-in user, sent as `Authorization: Key <key>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side_channel_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_url: Option<String>,
}

fn trimmed_non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_ref()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

impl AppSettings {
    pub fn settings_path() -> Option<PathBuf> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
            return Some(PathBuf::from(dir).join("settings.json"));
        }
        dirs::home_dir().map(|home| home.join(".openkey").join("settings.json"))
    }

    fn normalize(&mut self) {
        self.server_url = trimmed_non_empty(&self.server_url);
        self.session_key = trimmed_non_empty(&self.session_key);
        self.side_channel_url = trimmed_non_empty(&self.side_channel_url);
        self.help_url = trimmed_non_empty(&self.help_url);
        self.language = self
            .language
            .as_ref()
            .map(|s| s.trim())
            .filter(|s| matches!(*s, "en" | "zh"))
            .map(|s| s.to_string());
        self.timeout_secs = self.timeout_secs.map(|t| t.max(1));
    }

    pub fn server_url(&self) -> &str {
        self.server_url.as_deref().unwrap_or(DEFAULT_SERVER_URL)
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    pub fn help_url(&self) -> &str {
        self.help_url.as_deref().unwrap_or(DEFAULT_HELP_URL)
    }

    pub fn load() -> Self {
        match Self::settings_path() {
            Some(path) => Self::load_from(&path),
            None => {
                log::warn!("无法获取用户主目录，使用默认设置");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Self {
        if let Ok(content) = fs::read_to_string(path) {
            match serde_json::from_str::<AppSettings>(&content) {
                Ok(mut settings) => {
                    settings.normalize();
                    settings
                }
                Err(err) => {
                    log::warn!(
                        "解析设置文件失败，将使用默认设置。路径: {}, 错误: {}",
                        path.display(),
                        err
                    );
                    Self::default()
                }
            }
        } else {
            Self::default()
        }
    }

    pub fn save(&self) -> Result<(), AppError> {
        let path = Self::settings_path()
            .ok_or_else(|| AppError::Config("无法获取用户主目录".to_string()))?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), AppError> {
        let mut normalized = self.clone();
        normalized.normalize();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| AppError::io(parent, e))?;
        }

        let json = serde_json::to_string_pretty(&normalized)
            .map_err(|e| AppError::JsonSerialize { source: e })?;
        fs::write(path, json).map_err(|e| AppError::io(path, e))?;
        Ok(())
    }
}

fn settings_store() -> &'static RwLock<AppSettings> {
    static STORE: OnceLock<RwLock<AppSettings>> = OnceLock::new();
    STORE.get_or_init(|| RwLock::new(AppSettings::load()))
}

pub fn get_settings() -> AppSettings {
    settings_store()
        .read()
        .map(|guard| guard.clone())
        .unwrap_or_default()
}

pub fn update_settings(mut new_settings: AppSettings) -> Result<(), AppError> {
    new_settings.normalize();
    new_settings.save()?;

    let mut guard = settings_store()
        .write()
        .map_err(|_| AppError::Message("写入设置锁失败".to_string()))?;
    *guard = new_settings;
    Ok(())
}

pub fn set_server_url(url: &str) -> Result<(), AppError> {
    crate::services::token_store::build_endpoint_url(url)?;
    let mut settings = get_settings();
    settings.server_url = Some(url.to_string());
    update_settings(settings)
}

pub fn set_session_key(key: Option<&str>) -> Result<(), AppError> {
    let mut settings = get_settings();
    settings.session_key = key.map(|k| k.to_string());
    update_settings(settings)
}
