//! 右下角的临时通知条

use super::theme::{ACCENT, LINK};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use unicode_width::UnicodeWidthStr;

const DEFAULT_TTL: Duration = Duration::from_secs(5);
/// 带操作的通知停留更久
const ACTION_TTL: Duration = Duration::from_secs(15);
const MAX_NOTICES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// 通知上可触发的操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeAction {
    ViewUpdates,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub text: String,
    pub level: NoticeLevel,
    pub action: Option<NoticeAction>,
    pub expires_at: Instant,
}

/// 通知队列，最新的显示在最上面
#[derive(Debug, Default)]
pub struct NoticeBoard {
    notices: VecDeque<Notice>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, text: impl Into<String>, level: NoticeLevel) {
        self.push_at(text.into(), level, None, Instant::now() + DEFAULT_TTL);
    }

    pub fn push_action(&mut self, text: impl Into<String>, action: NoticeAction) {
        self.push_at(text.into(), NoticeLevel::Info, Some(action), Instant::now() + ACTION_TTL);
    }

    fn push_at(
        &mut self,
        text: String,
        level: NoticeLevel,
        action: Option<NoticeAction>,
        expires_at: Instant,
    ) {
        // 同一操作的旧通知被替换，避免每小时检查堆出多条
        if let Some(action) = action {
            self.notices.retain(|n| n.action != Some(action));
        }
        self.notices.push_front(Notice {
            text,
            level,
            action,
            expires_at,
        });
        self.notices.truncate(MAX_NOTICES);
    }

    /// 移除已过期的通知
    pub fn prune(&mut self, now: Instant) {
        self.notices.retain(|n| n.expires_at > now);
    }

    pub fn current(&self) -> Option<&Notice> {
        self.notices.front()
    }

    /// 关闭最上面的通知，返回它携带的操作
    pub fn dismiss(&mut self) -> Option<NoticeAction> {
        self.notices.pop_front().and_then(|n| n.action)
    }

    pub fn len(&self) -> usize {
        self.notices.len()
    }
}

/// 在内容区域右下角渲染当前通知
pub fn render_notice(f: &mut Frame, board: &NoticeBoard, area: Rect) {
    let notice = match board.current() {
        Some(n) => n,
        None => return,
    };

    let hint = match notice.action {
        Some(NoticeAction::ViewUpdates) => "v 查看更新 | x 关闭",
        None => "x 关闭",
    };
    let more = if board.len() > 1 {
        format!(" (+{})", board.len() - 1)
    } else {
        String::new()
    };

    let text_width = UnicodeWidthStr::width(notice.text.as_str()).max(UnicodeWidthStr::width(hint));
    let width = (text_width as u16 + 4).min(area.width).max(20.min(area.width));
    let height = 4.min(area.height);
    let banner = Rect {
        x: area.x + area.width.saturating_sub(width + 1),
        y: area.y + area.height.saturating_sub(height + 3),
        width,
        height,
    };

    let color = match notice.level {
        NoticeLevel::Info => LINK,
        NoticeLevel::Success => Color::Green,
        NoticeLevel::Warning => Color::Yellow,
        NoticeLevel::Error => Color::Red,
    };

    let block = Block::default()
        .title(format!(" 通知{} ", more))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));

    let lines = vec![
        Line::from(Span::styled(
            notice.text.clone(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(hint, Style::default().fg(ACCENT))),
    ];

    f.render_widget(Clear, banner);
    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        banner,
    );
}
