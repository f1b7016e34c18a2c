mod dashboard;
mod layout;
mod notice;
mod settings;
pub mod state;
mod theme;
mod updates;

use crate::config::Config;
use crate::theme::{HttpThemeSource, Updater};
use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use notice::NoticeAction;
use ratatui::{backend::CrosstermBackend, Frame, Terminal};
use state::{App, AppEvent, AppMode};
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// 最短检查间隔，避免配置过小时频繁请求注册表
const MIN_CHECK_INTERVAL_SECS: u64 = 60;

pub async fn run(config: Config) -> Result<()> {
    let source = HttpThemeSource::from_config(&config)?;
    let updater = Arc::new(Updater::new(source, config.themes_dir()));
    log::info!("主题目录: {}", updater.themes_dir().display());

    // 终端初始化
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, updater);

    let (tx, mut rx) = mpsc::channel(32);

    // 启动时检查
    if app.config.settings.check_on_startup {
        updates::spawn_check(&mut app, &tx, false);
    }

    // 定时检查（第一次 tick 立即触发，跳过）
    let interval_secs = app.config.check_interval_secs.max(MIN_CHECK_INTERVAL_SECS);
    let tx_clone = tx.clone();
    let ticker = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
        interval.tick().await;
        loop {
            interval.tick().await;
            if tx_clone.send(AppEvent::CheckTick).await.is_err() {
                break;
            }
        }
    });

    // 主循环
    loop {
        app.notices.prune(Instant::now());

        terminal.draw(|f| ui(f, &app))?;

        // 处理按键
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(key, &mut app, &tx);
                }
            }
        }

        // 处理异步事件
        while let Ok(event) = rx.try_recv() {
            match event {
                AppEvent::CheckTick => {
                    updates::spawn_check(&mut app, &tx, false);
                }
                AppEvent::CheckFinished { manual, outcome } => {
                    app.handle_check_finished(manual, outcome);
                    let pending = app.updater.pending().len();
                    app.updates.clamp(pending);
                }
                AppEvent::UpdateFinished(outcome) => {
                    app.handle_update_outcome(outcome);
                }
                AppEvent::BatchFinished(outcomes) => {
                    app.handle_batch_finished(outcomes);
                }
                AppEvent::CopyFinished { url, copied } => {
                    app.handle_copy_finished(&url, copied);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    // 退出前中止进行中的下载
    app.cancel.cancel();
    ticker.abort();

    // 恢复终端
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    Ok(())
}

fn handle_key(key: event::KeyEvent, app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    match key.code {
        // q 仅在 Dashboard 退出
        KeyCode::Char('q') if app.mode == AppMode::Dashboard => {
            app.should_quit = true;
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
        }
        KeyCode::Esc => match app.mode {
            AppMode::Dashboard => {}
            AppMode::Updates => app.close_updates_view(),
            AppMode::Settings => {
                settings::handle_settings_key(key, app);
            }
        },
        // 通知操作
        KeyCode::Char('x') if app.notices.current().is_some() => {
            app.notices.dismiss();
        }
        KeyCode::Char('v')
            if app
                .notices
                .current()
                .is_some_and(|n| n.action == Some(NoticeAction::ViewUpdates)) =>
        {
            app.notices.dismiss();
            app.open_updates_view();
        }
        // 模式切换快捷键 (Shift + 字母)
        KeyCode::Char('U') => {
            if app.mode == AppMode::Settings {
                app.mode = AppMode::Dashboard;
            }
            app.open_updates_view();
        }
        KeyCode::Char('R') => {
            updates::spawn_check(app, tx, true);
        }
        KeyCode::Char('C') => {
            if app.mode == AppMode::Updates {
                app.close_updates_view();
            }
            app.mode = AppMode::Settings;
            app.build_settings_items();
        }
        // 委托给当前模式处理
        _ => match app.mode {
            AppMode::Updates => {
                updates::handle_updates_key(key, app, tx);
            }
            AppMode::Settings => {
                settings::handle_settings_key(key, app);
            }
            AppMode::Dashboard => {}
        },
    }
}

fn ui(f: &mut Frame, app: &App) {
    match app.mode {
        AppMode::Dashboard => dashboard::render_dashboard(f, app),
        AppMode::Updates => updates::render_updates(f, app),
        AppMode::Settings => settings::render_settings(f, app),
    }
    let area = f.area();
    notice::render_notice(f, &app.notices, area);
}
