//! 界面配色，全局统一使用

use ratatui::style::Color;

/// 标题与快捷键提示
pub const ACCENT: Color = Color::Rgb(245, 169, 184);
/// 仓库链接、普通通知
pub const LINK: Color = Color::Rgb(91, 206, 250);
/// 新版本号
pub const NEW_VERSION: Color = Color::Rgb(163, 190, 140);
/// 选中行背景色
pub const SEL_BG: Color = Color::Rgb(45, 35, 55);
pub const TEXT_BRIGHT: Color = Color::Rgb(255, 255, 255);
/// 次要信息
pub const MUTED: Color = Color::Rgb(130, 130, 140);
