use super::layout;
use super::notice::NoticeLevel;
use super::state::{App, AppEvent};
use super::theme::{ACCENT, LINK, MUTED, NEW_VERSION, SEL_BG, TEXT_BRIGHT};
use crate::theme::UpdateItem;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tokio::sync::mpsc;
use unicode_width::UnicodeWidthStr;

/// 每个更新项占用的行数（含空行）
const ITEM_HEIGHT: usize = 4;

/// 处理更新视图的按键事件
pub fn handle_updates_key(key: KeyEvent, app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    let total = app.updater.pending().len();
    app.updates.clamp(total);

    match key.code {
        KeyCode::Up => {
            app.updates.selected = app.updates.selected.saturating_sub(1);
        }
        KeyCode::Down => {
            if app.updates.selected + 1 < total {
                app.updates.selected += 1;
            }
        }
        KeyCode::Enter => {
            spawn_apply_selected(app, tx);
        }
        KeyCode::Char('A') => {
            spawn_apply_all(app, tx);
        }
        KeyCode::Char('o') => {
            copy_selected_repo(app, tx);
        }
        _ => {}
    }
}

/// 启动检查更新任务；manual 为 true 时没有结果也会提示
pub fn spawn_check(app: &mut App, tx: &mpsc::Sender<AppEvent>, manual: bool) {
    let updater = app.updater.clone();
    let tx_clone = tx.clone();

    if manual {
        app.notices.push("正在检查主题更新...", NoticeLevel::Info);
    }

    tokio::spawn(async move {
        let outcome = updater.check_for_updates().await;
        let _ = tx_clone.send(AppEvent::CheckFinished { manual, outcome }).await;
    });
}

/// 更新当前选中的主题
fn spawn_apply_selected(app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    if app.is_updating() {
        return;
    }
    let item = match app.updater.pending().get(app.updates.selected) {
        Some(item) => item.clone(),
        None => return,
    };

    let updater = app.updater.clone();
    let cancel = app.cancel.clone();
    let tx_clone = tx.clone();

    tokio::spawn(async move {
        let outcome = updater.apply_update(&item, &cancel).await;
        let _ = tx_clone.send(AppEvent::UpdateFinished(outcome)).await;
    });
}

/// 依次更新所有待更新主题
fn spawn_apply_all(app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    if app.is_updating() {
        return;
    }
    let items = app.updater.pending();
    if items.is_empty() {
        return;
    }

    let updater = app.updater.clone();
    let cancel = app.cancel.clone();
    let tx_clone = tx.clone();

    tokio::spawn(async move {
        let outcomes = updater.apply_all(&items, &cancel).await;
        let _ = tx_clone.send(AppEvent::BatchFinished(outcomes)).await;
    });
}

/// 复制选中主题的仓库地址；剪贴板工具在阻塞线程池中运行，不阻塞界面
fn copy_selected_repo(app: &App, tx: &mpsc::Sender<AppEvent>) {
    let repo = match app.updater.pending().get(app.updates.selected) {
        Some(item) => item.repo.clone(),
        None => return,
    };
    let url = app.config.repo_url(&repo);
    let tx_clone = tx.clone();

    tokio::spawn(async move {
        let text = url.clone();
        let copied = tokio::task::spawn_blocking(move || layout::copy_to_clipboard(&text))
            .await
            .unwrap_or(false);
        let _ = tx_clone.send(AppEvent::CopyFinished { url, copied }).await;
    });
}

/// 渲染更新视图
pub fn render_updates(f: &mut Frame, app: &App) {
    let chunks = layout::main_layout(f.area());
    let pending = app.updater.pending();

    let title = if app.is_updating() {
        "⚙️  正在更新主题...".to_string()
    } else if app.is_checking() {
        "🔍 正在检查更新...".to_string()
    } else {
        "🎨 主题更新".to_string()
    };
    layout::render_header(f, &title, chunks[0]);

    render_update_list(f, app, &pending, chunks[1]);
    render_updates_footer(f, app, &pending, chunks[2]);
}

fn render_update_list(f: &mut Frame, app: &App, pending: &[UpdateItem], area: Rect) {
    let summary = if pending.is_empty() {
        " 主题更新 ".to_string()
    } else {
        format!(" 你有 {} 个主题更新可用 ", pending.len())
    };
    let block = Block::default()
        .title(summary)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if pending.is_empty() {
        layout::render_centered_message(f, "没有可用更新，稍后再来看看。", inner);
        return;
    }

    let padded = inner.inner(Margin {
        horizontal: 1,
        vertical: 1,
    });

    let name_width = pending
        .iter()
        .map(|item| UnicodeWidthStr::width(item.name.as_str()))
        .max()
        .unwrap_or(0);

    let selected = app.updates.selected.min(pending.len() - 1);
    let mut lines: Vec<Line> = Vec::new();
    for (i, item) in pending.iter().enumerate() {
        lines.extend(item_lines(app, item, i == selected, name_width));
    }

    let scroll = layout::scroll_offset(selected, ITEM_HEIGHT, padded.height as usize);
    let visible: Vec<Line> = lines
        .into_iter()
        .skip(scroll)
        .take(padded.height as usize)
        .collect();

    f.render_widget(Paragraph::new(visible), padded);
}

/// 单个更新项：名称与版本、最低应用版本、仓库链接、空行
fn item_lines(
    app: &App,
    item: &UpdateItem,
    is_selected: bool,
    name_width: usize,
) -> Vec<Line<'static>> {
    let padding = name_width.saturating_sub(UnicodeWidthStr::width(item.name.as_str()));
    let base = if is_selected {
        Style::default().bg(SEL_BG)
    } else {
        Style::default()
    };
    let marker = if is_selected { "▶ " } else { "  " };

    let mut name_style = base.fg(TEXT_BRIGHT);
    if is_selected {
        name_style = name_style.add_modifier(Modifier::BOLD);
    }

    let min_app = if item.min_app_version.is_empty() {
        "最低应用版本: 未声明".to_string()
    } else {
        format!("最低应用版本: {}", item.min_app_version)
    };

    vec![
        Line::from(vec![
            Span::styled(marker.to_string(), base.fg(ACCENT)),
            Span::styled(format!("{}{}  ", item.name, " ".repeat(padding)), name_style),
            Span::styled(item.current_version.clone(), base.fg(MUTED)),
            Span::styled(" → ".to_string(), base.fg(MUTED)),
            Span::styled(
                item.new_version.clone(),
                base.fg(NEW_VERSION).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(Span::styled(format!("    {}", min_app), Style::default().fg(MUTED))),
        Line::from(Span::styled(
            format!("    {}", app.config.repo_url(&item.repo)),
            Style::default().fg(LINK).add_modifier(Modifier::UNDERLINED),
        )),
        Line::from(""),
    ]
}

fn render_updates_footer(f: &mut Frame, app: &App, pending: &[UpdateItem], area: Rect) {
    let footer_text = if app.is_updating() {
        "更新进行中... | Esc 关闭并取消"
    } else if pending.is_empty() {
        "R 检查更新 | Esc 返回"
    } else {
        "↑↓ 选择 | Enter 更新 | A 全部更新 | o 复制仓库地址 | Esc 返回"
    };

    layout::render_footer(f, footer_text, area);
}
