//! 远程主题数据源：注册表、manifest 与样式表

use super::error::FetchError;
use super::types::RegistryEntry;
use crate::config::Config;
use reqwest::Client;
use std::future::Future;
use std::time::Duration;

/// 主题远程数据的获取接口，解析器与更新器都只依赖它
pub trait ThemeSource: Send + Sync {
    /// 获取社区主题注册表
    fn fetch_registry(
        &self,
    ) -> impl Future<Output = Result<Vec<RegistryEntry>, FetchError>> + Send;

    /// 获取仓库中 manifest.json 的原始文本
    fn fetch_manifest(
        &self,
        repo: &str,
    ) -> impl Future<Output = Result<String, FetchError>> + Send;

    /// 获取仓库中 theme.css 的原始文本
    fn fetch_stylesheet(
        &self,
        repo: &str,
    ) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// 基于 reqwest 的 HTTP 数据源
#[derive(Debug, Clone)]
pub struct HttpThemeSource {
    client: Client,
    registry_url: String,
    raw_base_url: String,
}

impl HttpThemeSource {
    /// 每个请求最多等待 `timeout`，超时后返回错误，检查与更新因此总会结束
    pub fn new(
        registry_url: String,
        raw_base_url: String,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            registry_url,
            raw_base_url: raw_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        Self::new(
            config.registry_url.clone(),
            config.raw_base_url.clone(),
            Duration::from_secs(config.request_timeout_secs.max(1)),
        )
    }

    /// `<raw_base_url>/<repo>/HEAD/<file>`
    fn raw_url(&self, repo: &str, file: &str) -> String {
        format!("{}/{}/HEAD/{}", self.raw_base_url, repo, file)
    }

    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status(),
            });
        }

        Ok(response.text().await?)
    }
}

impl ThemeSource for HttpThemeSource {
    async fn fetch_registry(&self) -> Result<Vec<RegistryEntry>, FetchError> {
        let text = self.get_text(&self.registry_url).await?;
        let entries: Vec<RegistryEntry> = serde_json::from_str(&text)?;
        log::debug!("注册表共 {} 个主题", entries.len());
        Ok(entries)
    }

    async fn fetch_manifest(&self, repo: &str) -> Result<String, FetchError> {
        self.get_text(&self.raw_url(repo, "manifest.json")).await
    }

    async fn fetch_stylesheet(&self, repo: &str) -> Result<String, FetchError> {
        self.get_text(&self.raw_url(repo, "theme.css")).await
    }
}
