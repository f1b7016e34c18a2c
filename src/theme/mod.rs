//! 主题模块：本地主题清单、社区注册表对照与主题文件更新

pub mod applier;
pub mod error;
pub mod inventory;
pub mod resolver;
pub mod source;
pub mod types;
pub mod updater;

#[cfg(test)]
pub(crate) mod fake;

// 重新导出常用类型
pub use source::HttpThemeSource;
pub use types::{Activity, CheckOutcome, UpdateItem, UpdateOutcome};
pub use updater::Updater;
