use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_REGISTRY_URL: &str =
    "https://raw.githubusercontent.com/obsidianmd/obsidian-releases/refs/heads/master/community-css-themes.json";
pub const DEFAULT_RAW_BASE_URL: &str = "https://raw.githubusercontent.com";

/// 用户可在设置页切换的开关
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// 发现新更新时弹出通知
    pub notify_on_new_update: bool,
    /// 启动时自动检查
    pub check_on_startup: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            notify_on_new_update: true,
            check_on_startup: true,
        }
    }
}

/// 配置文件中缺失的字段一律取默认值，因此旧配置文件在新增字段后仍可读取
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// vault 根目录
    pub vault_dir: PathBuf,
    /// vault 内的配置目录名
    pub config_dir: String,
    pub registry_url: String,
    pub raw_base_url: String,
    pub repo_base_url: String,
    /// 后台检查间隔（秒）
    pub check_interval_secs: u64,
    /// 单个 HTTP 请求的超时（秒）
    pub request_timeout_secs: u64,
    pub settings: Settings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vault_dir: PathBuf::from("."),
            config_dir: ".obsidian".to_string(),
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            raw_base_url: DEFAULT_RAW_BASE_URL.to_string(),
            repo_base_url: "https://github.com".to_string(),
            check_interval_secs: 60 * 60,
            request_timeout_secs: 30,
            settings: Settings::default(),
        }
    }
}

impl Config {
    pub fn config_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".config/theme-updater/config.toml")
    }

    pub fn load_or_default() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = fs::read_to_string(&config_path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();
        if let Some(dir) = config_path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&config_path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// `<vault>/<config_dir>/themes`
    pub fn themes_dir(&self) -> PathBuf {
        self.vault_dir.join(&self.config_dir).join("themes")
    }

    /// 主题仓库的网页地址
    pub fn repo_url(&self, repo: &str) -> String {
        format!("{}/{}", self.repo_base_url.trim_end_matches('/'), repo)
    }
}
