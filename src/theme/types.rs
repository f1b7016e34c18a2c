//! 主题相关数据类型定义

use serde::{Deserialize, Serialize};

/// 本地已安装主题（来自 manifest.json）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultTheme {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub min_app_version: String,
}

/// 社区主题注册表条目
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegistryEntry {
    pub name: String,
    #[allow(dead_code)]
    #[serde(default)]
    pub author: String,
    pub repo: String,
}

/// 远程主题 manifest，只关心版本字段
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteManifest {
    pub version: String,
    #[serde(default)]
    pub min_app_version: String,
}

/// 一条可用但尚未应用的更新
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateItem {
    pub name: String,
    pub current_version: String,
    pub new_version: String,
    pub min_app_version: String,
    pub repo: String,
}

/// 单个主题更新的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated { name: String, version: String },
    /// 已有其它操作在进行
    Busy(Activity),
    /// 被取消，文件未写入
    Aborted { name: String },
    Failed { name: String, error: String },
}

/// 一次检查更新的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Checked { installed: usize, updates: usize },
    Busy(Activity),
}

/// 正在进行中的操作类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    Checking,
    Applying,
}
