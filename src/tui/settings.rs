use super::layout;
use super::state::{App, AppMode, SettingsItem};
use super::theme::{ACCENT, LINK, MUTED, SEL_BG, TEXT_BRIGHT};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::{Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

/// 处理设置模式按键
pub fn handle_settings_key(key: KeyEvent, app: &mut App) {
    let total = app.settings_focusable_count();

    match key.code {
        KeyCode::Esc => {
            app.mode = AppMode::Dashboard;
        }
        KeyCode::Up => {
            app.settings.selected = app.settings.selected.saturating_sub(1);
            app.settings.message = None;
        }
        KeyCode::Down => {
            if app.settings.selected + 1 < total {
                app.settings.selected += 1;
            }
            app.settings.message = None;
        }
        KeyCode::Enter | KeyCode::Char(' ') => {
            // 切换即保存
            app.toggle_settings_item();
        }
        _ => {}
    }
}

/// 渲染设置视图
pub fn render_settings(f: &mut Frame, app: &App) {
    let chunks = layout::main_layout(f.area());

    layout::render_header(f, "⚙  设置", chunks[0]);

    let content_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let content_inner = content_block.inner(chunks[1]);
    f.render_widget(content_block, chunks[1]);

    let padded = content_inner.inner(Margin {
        horizontal: 2,
        vertical: 1,
    });

    if padded.height < 3 {
        return;
    }

    render_items(f, app, padded);

    let footer_text = "↑↓ 选择 | Enter/Space 切换 | Esc 返回";

    // 如果有保存结果，显示在 footer
    if let Some(msg) = &app.settings.message {
        let msg_color = if msg.starts_with('✓') {
            Color::Green
        } else {
            Color::Red
        };
        let footer_block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let footer_inner = footer_block.inner(chunks[2]);
        f.render_widget(footer_block, chunks[2]);
        let footer_padded = footer_inner.inner(Margin {
            horizontal: 1,
            vertical: 0,
        });
        let para = Paragraph::new(Line::from(vec![
            Span::styled(format!("{} | ", msg), Style::default().fg(msg_color)),
            Span::styled(footer_text, Style::default().fg(Color::DarkGray)),
        ]));
        f.render_widget(para, footer_padded);
    } else {
        layout::render_footer(f, footer_text, chunks[2]);
    }
}

/// 渲染设置项列表：开关一行，说明一行
fn render_items(f: &mut Frame, app: &App, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();
    let mut focusable_idx = 0;

    for (i, item) in app.settings.items.iter().enumerate() {
        match item {
            SettingsItem::Section(title) => {
                if i > 0 {
                    lines.push(Line::from(""));
                }
                lines.push(Line::from(Span::styled(
                    format!("── {} ──", title),
                    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
                )));
            }
            SettingsItem::Toggle {
                label, desc, value, ..
            } => {
                let is_selected = focusable_idx == app.settings.selected;
                let checkbox = if *value { "[✓]" } else { "[ ]" };
                let checkbox_color = if *value { LINK } else { MUTED };

                let (base, label_color) = if is_selected {
                    (
                        Style::default().bg(SEL_BG).add_modifier(Modifier::BOLD),
                        TEXT_BRIGHT,
                    )
                } else {
                    (Style::default(), Color::White)
                };

                lines.push(Line::from(vec![
                    Span::styled(format!(" {} ", checkbox), base.fg(checkbox_color)),
                    Span::styled(format!(" {}", label), base.fg(label_color)),
                ]));
                lines.push(Line::from(Span::styled(
                    format!("      {}", desc),
                    Style::default().fg(MUTED),
                )));
                focusable_idx += 1;
            }
        }
    }

    let visible: Vec<Line> = lines.into_iter().take(area.height as usize).collect();
    f.render_widget(Paragraph::new(visible), area);
}
