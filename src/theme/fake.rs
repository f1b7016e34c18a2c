//! 测试用的内存数据源

use super::error::FetchError;
use super::source::ThemeSource;
use super::types::RegistryEntry;
use reqwest::StatusCode;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
pub struct FakeSource {
    registry: Vec<RegistryEntry>,
    registry_status: Option<StatusCode>,
    manifests: HashMap<String, String>,
    stylesheets: HashMap<String, String>,
    /// 这些仓库的 theme.css 请求永远不会完成
    hanging: HashSet<String>,
    manifest_requests: AtomicUsize,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_theme(mut self, name: &str, repo: &str) -> Self {
        self.registry.push(RegistryEntry {
            name: name.to_string(),
            author: "someone".to_string(),
            repo: repo.to_string(),
        });
        self
    }

    pub fn with_registry_status(mut self, status: u16) -> Self {
        self.registry_status = StatusCode::from_u16(status).ok();
        self
    }

    pub fn with_manifest(mut self, repo: &str, text: &str) -> Self {
        self.manifests.insert(repo.to_string(), text.to_string());
        self
    }

    pub fn with_stylesheet(mut self, repo: &str, text: &str) -> Self {
        self.stylesheets.insert(repo.to_string(), text.to_string());
        self
    }

    pub fn with_hanging_stylesheet(mut self, repo: &str) -> Self {
        self.hanging.insert(repo.to_string());
        self
    }

    pub fn manifest_requests(&self) -> usize {
        self.manifest_requests.load(Ordering::SeqCst)
    }

    fn lookup(
        files: &HashMap<String, String>,
        repo: &str,
        file: &str,
    ) -> Result<String, FetchError> {
        files.get(repo).cloned().ok_or_else(|| FetchError::Status {
            url: format!("fake://{repo}/HEAD/{file}"),
            status: StatusCode::NOT_FOUND,
        })
    }
}

impl ThemeSource for FakeSource {
    async fn fetch_registry(&self) -> Result<Vec<RegistryEntry>, FetchError> {
        match self.registry_status {
            Some(status) => Err(FetchError::Status {
                url: "fake://registry".to_string(),
                status,
            }),
            None => Ok(self.registry.clone()),
        }
    }

    async fn fetch_manifest(&self, repo: &str) -> Result<String, FetchError> {
        self.manifest_requests.fetch_add(1, Ordering::SeqCst);
        Self::lookup(&self.manifests, repo, "manifest.json")
    }

    async fn fetch_stylesheet(&self, repo: &str) -> Result<String, FetchError> {
        if self.hanging.contains(repo) {
            std::future::pending::<()>().await;
        }
        Self::lookup(&self.stylesheets, repo, "theme.css")
    }
}
