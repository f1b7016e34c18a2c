//! 下载并覆盖单个主题的 manifest.json 与 theme.css

use super::error::FetchError;
use super::inventory::theme_paths;
use super::source::ThemeSource;
use super::types::UpdateItem;
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// 获取远程文件并原样写入本地主题目录。
///
/// 两个请求并发进行，并与取消信号竞争；取消时请求被直接丢弃，本地文件不会被改动。
/// manifest.json 最后写入：样式表写入失败时本地仍是旧版本号，下次检查会再次列出该更新。
pub async fn download_theme<S: ThemeSource>(
    source: &S,
    themes_dir: &Path,
    item: &UpdateItem,
    cancel: &CancellationToken,
) -> Result<(), FetchError> {
    let fetch = async {
        tokio::try_join!(
            source.fetch_manifest(&item.repo),
            source.fetch_stylesheet(&item.repo)
        )
    };

    let (manifest, stylesheet) = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(FetchError::Aborted),
        result = fetch => result?,
    };

    let (manifest_path, stylesheet_path) = theme_paths(themes_dir, &item.name);
    if let Some(dir) = manifest_path.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }
    tokio::fs::write(&stylesheet_path, stylesheet).await?;
    tokio::fs::write(&manifest_path, manifest).await?;

    Ok(())
}
