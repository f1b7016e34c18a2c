use thiserror::Error;

/// 获取远程主题资源时的错误
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("请求 {url} 失败 (状态码 {status})")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("网络错误: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON 解析失败: {0}")]
    Json(#[from] serde_json::Error),

    #[error("版本号无效: {0}")]
    Version(#[from] semver::Error),

    #[error("文件读写失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("操作已取消")]
    Aborted,
}

impl FetchError {
    pub fn is_aborted(&self) -> bool {
        matches!(self, FetchError::Aborted)
    }
}
