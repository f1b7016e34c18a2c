//! 读取 vault 中已安装的主题

use super::error::FetchError;
use super::types::VaultTheme;
use std::path::{Path, PathBuf};

pub const MANIFEST_FILE: &str = "manifest.json";
pub const STYLESHEET_FILE: &str = "theme.css";

/// 列出 themes 目录下所有已安装主题。
///
/// 单个主题的 manifest 缺失或损坏只会记录警告并跳过，不影响其它主题。
/// themes 目录不存在时返回空列表。
pub async fn list_installed_themes(themes_dir: &Path) -> Vec<VaultTheme> {
    let mut dirs = match theme_folders(themes_dir).await {
        Ok(dirs) => dirs,
        Err(e) => {
            log::warn!("无法读取主题目录 {}: {}", themes_dir.display(), e);
            return Vec::new();
        }
    };
    dirs.sort();

    let mut themes = Vec::with_capacity(dirs.len());
    for dir in dirs {
        match read_manifest(&dir).await {
            Ok(theme) => themes.push(theme),
            Err(e) => {
                log::warn!("跳过主题 {}: {}", dir.display(), e);
            }
        }
    }
    themes
}

/// 单个主题的文件路径
pub fn theme_paths(themes_dir: &Path, name: &str) -> (PathBuf, PathBuf) {
    let dir = themes_dir.join(name);
    (dir.join(MANIFEST_FILE), dir.join(STYLESHEET_FILE))
}

async fn theme_folders(themes_dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(themes_dir).await?;
    let mut dirs = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        // 跟随符号链接
        let is_dir = tokio::fs::metadata(&path)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if is_dir {
            dirs.push(path);
        }
    }
    Ok(dirs)
}

async fn read_manifest(dir: &Path) -> Result<VaultTheme, FetchError> {
    let content = tokio::fs::read_to_string(dir.join(MANIFEST_FILE)).await?;
    Ok(serde_json::from_str(&content)?)
}
