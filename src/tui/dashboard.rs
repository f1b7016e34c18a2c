use super::state::App;
use super::theme::ACCENT;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const ASCII_LOGO: &str = r#"
 ▀█▀ █ █ █▀▀ █▀▄▀█ █▀▀ █▀
  █  █▀█ ██▄ █ ▀ █ ██▄ ▄█
  █ █ █▀█ █▀▄ ▄▀█ ▀█▀ █▀▀ █▀█
  █▄█ █▀▀ █▄▀ █▀█  █  ██▄ █▀▄"#;

pub fn render_dashboard(f: &mut Frame, app: &App) {
    let area = f.area();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    f.render_widget(block, area);

    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(""));

    for logo_line in ASCII_LOGO.lines() {
        lines.push(Line::from(vec![Span::styled(
            logo_line.to_string(),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(""));

    lines.push(section_title("── Vault ──"));
    lines.push(Line::from(""));

    let state = app.updater.snapshot();
    let vault = app.config.vault_dir.display().to_string();
    let themes_dir = app.updater.themes_dir().display().to_string();
    lines.push(info_line("Vault  ", &vault));
    lines.push(info_line("主题目录  ", &themes_dir));

    let status = if app.is_updating() {
        "更新中...".to_string()
    } else if app.is_checking() {
        "检查中...".to_string()
    } else if let Some(at) = app.last_checked {
        format!("上次检查 {}", at.format("%Y-%m-%d %H:%M"))
    } else {
        "尚未检查".to_string()
    };

    if app.last_checked.is_some() {
        lines.push(info_line("已安装主题  ", &format!("{} 个", state.themes.len())));
        lines.push(info_line("可用更新  ", &format!("{} 个", state.updates.len())));
    } else {
        lines.push(info_line("已安装主题  ", "-"));
        lines.push(info_line("可用更新  ", "-"));
    }
    lines.push(info_line("状态  ", &status));

    lines.push(Line::from(""));
    lines.push(Line::from(""));

    lines.push(section_title("── 快捷键 ──"));
    lines.push(Line::from(""));

    lines.push(shortcut_line("U", " 查看更新      "));
    lines.push(shortcut_line("R", " 检查更新      "));
    lines.push(shortcut_line("C", " 设置          "));
    lines.push(shortcut_line("q", " 退出          "));

    lines.push(Line::from(""));
    lines.push(Line::from(""));

    lines.push(Line::from(vec![Span::styled(
        format!("theme-updater v{}  ", env!("CARGO_PKG_VERSION")),
        Style::default().fg(Color::DarkGray),
    )]));

    let content_height = lines.len() as u16;
    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);

    // 垂直居中
    let inner = area.inner(ratatui::layout::Margin {
        horizontal: 1,
        vertical: 1,
    });

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(content_height),
            Constraint::Min(0),
        ])
        .split(inner);

    f.render_widget(paragraph, vertical[1]);
}

fn section_title(title: &str) -> Line<'_> {
    Line::from(vec![Span::styled(
        title,
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    )])
}

/// 信息行: "标签: 值"
fn info_line(label: &str, value: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{label}: "),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::styled(value.to_string(), Style::default().fg(Color::White)),
    ])
}

/// 快捷键行: "  X  描述"
fn shortcut_line<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::styled(
            format!("  {key}"),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(desc.to_string(), Style::default().fg(Color::White)),
    ])
}
