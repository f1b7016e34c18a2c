//! 对照注册表与远程 manifest，找出可更新的主题

use super::error::FetchError;
use super::source::ThemeSource;
use super::types::{RegistryEntry, RemoteManifest, UpdateItem, VaultTheme};
use semver::Version;
use std::cmp::Ordering;

/// 解析已安装主题的可用更新。
///
/// 注册表获取失败视为“没有更新”；单个主题的远程 manifest 获取或解析失败只跳过该主题。
/// 结果顺序与 `installed` 的顺序一致。
pub async fn resolve_updates<S: ThemeSource>(
    source: &S,
    installed: &[VaultTheme],
) -> Vec<UpdateItem> {
    let registry = match source.fetch_registry().await {
        Ok(registry) => registry,
        Err(e) => {
            log::warn!("获取主题注册表失败，跳过本次检查: {}", e);
            return Vec::new();
        }
    };

    let mut updates: Vec<UpdateItem> = Vec::new();

    for theme in installed {
        // 每个主题名最多一条待更新
        if updates.iter().any(|u| u.name == theme.name) {
            log::debug!("主题 {} 重复安装，忽略后续副本", theme.name);
            continue;
        }

        // 重名时取第一个
        let entry = match registry.iter().find(|entry| entry.name == theme.name) {
            Some(entry) => entry,
            None => {
                log::debug!("主题 {} 不在社区注册表中", theme.name);
                continue;
            }
        };

        match check_theme(source, theme, entry).await {
            Ok(Some(item)) => updates.push(item),
            Ok(None) => {}
            Err(e) => {
                log::warn!("检查主题 {} ({}) 失败: {}", theme.name, entry.repo, e);
            }
        }
    }

    updates
}

async fn check_theme<S: ThemeSource>(
    source: &S,
    theme: &VaultTheme,
    entry: &RegistryEntry,
) -> Result<Option<UpdateItem>, FetchError> {
    let text = source.fetch_manifest(&entry.repo).await?;
    let remote: RemoteManifest = serde_json::from_str(&text)?;

    if !is_newer(&remote.version, &theme.version)? {
        return Ok(None);
    }

    Ok(Some(UpdateItem {
        name: theme.name.clone(),
        current_version: theme.version.clone(),
        new_version: remote.version,
        min_app_version: remote.min_app_version,
        repo: entry.repo.clone(),
    }))
}

/// `remote > local`，按 semver 优先级比较（忽略 build 元数据）
pub fn is_newer(remote: &str, local: &str) -> Result<bool, semver::Error> {
    let remote = parse_version(remote)?;
    let local = parse_version(local)?;
    Ok(remote.cmp_precedence(&local) == Ordering::Greater)
}

/// 宽松解析：允许前缀 `v` 以及省略的 minor/patch（`1.2` → `1.2.0`）
pub fn parse_version(raw: &str) -> Result<Version, semver::Error> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);

    // 只补全纯数字核心部分，预发布或 build 后缀原样交给 semver
    let core_end = trimmed.find(['-', '+']).unwrap_or(trimmed.len());
    let (core, rest) = trimmed.split_at(core_end);
    let padded = match core.split('.').count() {
        1 => format!("{core}.0.0{rest}"),
        2 => format!("{core}.0{rest}"),
        _ => trimmed.to_string(),
    };

    Version::parse(&padded)
}
