use crate::error::{ClassifierError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 分類サービスの既定エンドポイント
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000/api/analyze";

/// 通知の自動非表示までの時間（ミリ秒）
pub const DEFAULT_NOTIFICATION_DELAY_MS: u64 = 5000;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub endpoint: String,
    pub notification_delay_ms: u64,
    /// 未設定ならHTTPクライアントの既定に任せる
    pub timeout_seconds: Option<u64>,
    /// APIキー保存先（未設定なら設定ディレクトリ内の settings.json）
    pub settings_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.into(),
            notification_delay_ms: DEFAULT_NOTIFICATION_DELAY_MS,
            timeout_seconds: None,
            settings_path: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        crate::settings::write_atomic(path, content.as_bytes())
    }

    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ClassifierError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("sheet-classifier"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    pub fn settings_path(&self) -> Result<PathBuf> {
        match &self.settings_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::config_dir()?.join("settings.json")),
        }
    }

    pub fn notification_delay(&self) -> Duration {
        Duration::from_millis(self.notification_delay_ms)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}
