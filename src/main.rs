mod config;
mod theme;
mod tui;

use anyhow::Result;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    // 加载配置
    let mut config = config::Config::load_or_default()?;

    // vault 路径优先级：命令行参数 > 环境变量 > 配置文件
    if let Some(vault) = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("THEME_UPDATER_VAULT").ok())
    {
        config.vault_dir = PathBuf::from(vault);
    }

    if !config.vault_dir.join(&config.config_dir).is_dir() {
        eprintln!(
            "错误: {} 下没有找到 {} 目录",
            config.vault_dir.display(),
            config.config_dir
        );
        eprintln!("用法: theme-updater <vault 路径>");
        eprintln!("或设置环境变量: export THEME_UPDATER_VAULT='/path/to/vault'");
        eprintln!(
            "或在配置文件 {} 中设置 vault_dir",
            config::Config::config_path().display()
        );
        std::process::exit(1);
    }

    tui::run(config).await?;

    Ok(())
}
