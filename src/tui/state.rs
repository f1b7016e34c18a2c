use super::notice::{NoticeAction, NoticeBoard, NoticeLevel};
use crate::config::Config;
use crate::theme::{Activity, CheckOutcome, HttpThemeSource, UpdateOutcome, Updater};
use chrono::{DateTime, Local};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

// ========== 枚举 ==========

#[derive(Debug, Clone, PartialEq)]
pub enum AppMode {
    Dashboard,
    Updates,  // Shift+U: 查看更新
    Settings, // Shift+C: 设置
}

/// 设置页面项目类型
#[derive(Debug, Clone)]
pub enum SettingsItem {
    /// 分组标题（不可选中）
    Section(String),
    /// 复选框开关项
    Toggle {
        label: String,
        desc: String,
        key: String,
        value: bool,
    },
}

// ========== 事件 ==========

#[derive(Debug)]
pub enum AppEvent {
    /// 定时检查
    CheckTick,
    CheckFinished { manual: bool, outcome: CheckOutcome },
    UpdateFinished(UpdateOutcome),
    BatchFinished(Vec<UpdateOutcome>),
    /// 剪贴板工具执行完毕
    CopyFinished { url: String, copied: bool },
}

// ========== 子状态结构体 ==========

pub struct UpdatesViewState {
    pub selected: usize,
}

pub struct SettingsModeState {
    pub items: Vec<SettingsItem>,
    pub selected: usize,
    pub message: Option<String>,
}

impl UpdatesViewState {
    pub fn new() -> Self {
        Self { selected: 0 }
    }

    /// 列表变短后把选中项拉回范围内
    pub fn clamp(&mut self, len: usize) {
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }
}

impl SettingsModeState {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            selected: 0,
            message: None,
        }
    }
}

// ========== App ==========

pub struct App {
    pub mode: AppMode,
    pub config: Config,
    pub updater: Arc<Updater<HttpThemeSource>>,
    /// 更新视图打开期间共享的取消令牌，视图关闭时触发并换新
    pub cancel: CancellationToken,
    pub notices: NoticeBoard,
    pub last_checked: Option<DateTime<Local>>,
    pub should_quit: bool,
    // 子状态
    pub updates: UpdatesViewState,
    pub settings: SettingsModeState,
}

impl App {
    pub fn new(config: Config, updater: Arc<Updater<HttpThemeSource>>) -> Self {
        Self {
            mode: AppMode::Dashboard,
            config,
            updater,
            cancel: CancellationToken::new(),
            notices: NoticeBoard::new(),
            last_checked: None,
            should_quit: false,
            updates: UpdatesViewState::new(),
            settings: SettingsModeState::new(),
        }
    }

    /// 是否有主题正在更新（更新按钮此时不可用）
    pub fn is_updating(&self) -> bool {
        self.updater.activity() == Some(Activity::Applying)
    }

    pub fn is_checking(&self) -> bool {
        self.updater.activity() == Some(Activity::Checking)
    }

    // ===== 更新视图生命周期 =====

    pub fn open_updates_view(&mut self) {
        if self.mode == AppMode::Updates {
            return;
        }
        if self.cancel.is_cancelled() {
            self.cancel = CancellationToken::new();
        }
        self.mode = AppMode::Updates;
        self.updates = UpdatesViewState::new();
    }

    /// 关闭更新视图：中止进行中的下载，并为下次打开准备新令牌
    pub fn close_updates_view(&mut self) {
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        if self.mode == AppMode::Updates {
            self.mode = AppMode::Dashboard;
        }
    }

    // ===== 异步结果处理 =====

    pub fn handle_check_finished(&mut self, manual: bool, outcome: CheckOutcome) {
        match outcome {
            CheckOutcome::Busy(activity) => {
                if manual {
                    self.notices.push(busy_message(activity), NoticeLevel::Warning);
                }
            }
            CheckOutcome::Checked { updates, .. } => {
                self.last_checked = Some(Local::now());
                if updates == 0 {
                    if manual {
                        self.notices.push("没有发现主题更新", NoticeLevel::Info);
                    }
                } else if self.config.settings.notify_on_new_update {
                    self.notices.push_action(
                        format!("你有 {} 个主题更新可用", updates),
                        NoticeAction::ViewUpdates,
                    );
                }
            }
        }
    }

    pub fn handle_update_outcome(&mut self, outcome: UpdateOutcome) {
        match outcome {
            UpdateOutcome::Updated { name, version } => {
                self.notices.push(
                    format!("主题 {} 已更新到 {}", name, version),
                    NoticeLevel::Success,
                );
            }
            UpdateOutcome::Busy(activity) => {
                self.notices.push(busy_message(activity), NoticeLevel::Warning);
            }
            UpdateOutcome::Aborted { name } => {
                self.notices
                    .push(format!("主题 {} 的更新已取消", name), NoticeLevel::Info);
            }
            UpdateOutcome::Failed { name, error } => {
                self.notices
                    .push(format!("更新主题 {} 失败: {}", name, error), NoticeLevel::Error);
            }
        }
        self.updates.clamp(self.updater.pending().len());
    }

    /// 批量更新结束后逐条通知，并关闭更新视图
    pub fn handle_batch_finished(&mut self, outcomes: Vec<UpdateOutcome>) {
        let refused = matches!(outcomes.as_slice(), [UpdateOutcome::Busy(_)]);
        for outcome in outcomes {
            self.handle_update_outcome(outcome);
        }
        if !refused {
            self.close_updates_view();
        }
    }

    pub fn handle_copy_finished(&mut self, url: &str, copied: bool) {
        if copied {
            self.notices.push(format!("已复制 {}", url), NoticeLevel::Success);
        } else {
            self.notices.push(
                "未找到剪贴板工具 (wl-copy/xclip/xsel)",
                NoticeLevel::Warning,
            );
        }
    }

    // ===== 设置 =====

    /// 从当前 config 构建设置项列表
    pub fn build_settings_items(&mut self) {
        let settings = &self.config.settings;
        self.settings.items = vec![
            SettingsItem::Section("检查更新".to_string()),
            SettingsItem::Toggle {
                label: "启动时检查更新".to_string(),
                desc: "启动时自动检查主题更新，关闭后需手动检查".to_string(),
                key: "check_on_startup".to_string(),
                value: settings.check_on_startup,
            },
            SettingsItem::Section("通知".to_string()),
            SettingsItem::Toggle {
                label: "发现新更新时通知".to_string(),
                desc: "找到可用更新时弹出通知".to_string(),
                key: "notify_on_new_update".to_string(),
                value: settings.notify_on_new_update,
            },
        ];
        self.settings.selected = 0;
        self.settings.message = None;
    }

    /// 切换 Toggle 项的值，同步到 config 并立即保存
    pub fn toggle_settings_item(&mut self) {
        if self.flip_selected_toggle() {
            self.settings.message = Some(match self.config.save() {
                Ok(()) => format!("✓ 已保存到 {}", Config::config_path().display()),
                Err(e) => {
                    log::error!("保存配置失败: {}", e);
                    format!("✗ 保存失败: {}", e)
                }
            });
        }
    }

    /// 只修改内存中的值，返回是否有开关被切换
    fn flip_selected_toggle(&mut self) -> bool {
        let real_idx = match self.focusable_indices().get(self.settings.selected) {
            Some(&idx) => idx,
            None => return false,
        };

        if let SettingsItem::Toggle { key, value, .. } = &mut self.settings.items[real_idx] {
            *value = !*value;
            match key.as_str() {
                "check_on_startup" => self.config.settings.check_on_startup = *value,
                "notify_on_new_update" => self.config.settings.notify_on_new_update = *value,
                _ => {}
            }
            return true;
        }
        false
    }

    fn focusable_indices(&self) -> Vec<usize> {
        self.settings
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| !matches!(item, SettingsItem::Section(_)))
            .map(|(i, _)| i)
            .collect()
    }

    /// 获取可聚焦项数量
    pub fn settings_focusable_count(&self) -> usize {
        self.focusable_indices().len()
    }
}

fn busy_message(activity: Activity) -> &'static str {
    match activity {
        Activity::Checking => "正在检查更新，请稍候",
        Activity::Applying => "主题正在更新中",
    }
}
