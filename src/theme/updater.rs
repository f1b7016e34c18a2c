//! 主题更新器：持有已安装主题与待更新列表，保证同一时间只有一个检查或更新在进行

use super::applier::download_theme;
use super::inventory::list_installed_themes;
use super::resolver::resolve_updates;
use super::source::ThemeSource;
use super::types::{Activity, CheckOutcome, UpdateItem, UpdateOutcome, VaultTheme};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;

const IDLE: u8 = 0;
const CHECKING: u8 = 1;
const APPLYING: u8 = 2;

/// 更新器的可变状态
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdaterState {
    pub themes: Vec<VaultTheme>,
    pub updates: Vec<UpdateItem>,
}

impl UpdaterState {
    /// 移除对应的待更新项，并把已安装主题的版本改为新版本
    fn mark_updated(&mut self, item: &UpdateItem) {
        if let Some(pos) = self.updates.iter().position(|u| u.name == item.name) {
            self.updates.remove(pos);
        }
        if let Some(theme) = self.themes.iter_mut().find(|t| t.name == item.name) {
            theme.version = item.new_version.clone();
        }
    }
}

/// 占用单飞槽位，drop 时释放
struct FlightGuard<'a> {
    slot: &'a AtomicU8,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.slot.store(IDLE, Ordering::SeqCst);
    }
}

pub struct Updater<S> {
    source: S,
    themes_dir: PathBuf,
    state: Mutex<UpdaterState>,
    activity: AtomicU8,
}

impl<S: ThemeSource> Updater<S> {
    pub fn new(source: S, themes_dir: PathBuf) -> Self {
        Self {
            source,
            themes_dir,
            state: Mutex::new(UpdaterState::default()),
            activity: AtomicU8::new(IDLE),
        }
    }

    pub fn themes_dir(&self) -> &Path {
        &self.themes_dir
    }

    /// 当前状态快照（读者可能看到两次渲染之间的变化）
    pub fn snapshot(&self) -> UpdaterState {
        self.lock().clone()
    }

    pub fn pending(&self) -> Vec<UpdateItem> {
        self.lock().updates.clone()
    }

    /// 正在进行的操作，空闲时为 None
    pub fn activity(&self) -> Option<Activity> {
        decode(self.activity.load(Ordering::SeqCst))
    }

    /// 重新扫描本地主题并对照注册表，整体替换状态
    pub async fn check_for_updates(&self) -> CheckOutcome {
        let _guard = match self.begin(CHECKING) {
            Ok(guard) => guard,
            Err(busy) => return CheckOutcome::Busy(busy),
        };

        let themes = list_installed_themes(&self.themes_dir).await;
        let updates = resolve_updates(&self.source, &themes).await;

        log::info!(
            "检查完成: {} 个已安装主题, {} 个可用更新",
            themes.len(),
            updates.len()
        );

        let outcome = CheckOutcome::Checked {
            installed: themes.len(),
            updates: updates.len(),
        };
        *self.lock() = UpdaterState { themes, updates };
        outcome
    }

    /// 更新单个主题
    pub async fn apply_update(
        &self,
        item: &UpdateItem,
        cancel: &CancellationToken,
    ) -> UpdateOutcome {
        let _guard = match self.begin(APPLYING) {
            Ok(guard) => guard,
            Err(busy) => return UpdateOutcome::Busy(busy),
        };
        self.apply_one(item, cancel).await
    }

    /// 依次更新多个主题；取消后不再开始下一个
    pub async fn apply_all(
        &self,
        items: &[UpdateItem],
        cancel: &CancellationToken,
    ) -> Vec<UpdateOutcome> {
        let _guard = match self.begin(APPLYING) {
            Ok(guard) => guard,
            Err(busy) => return vec![UpdateOutcome::Busy(busy)],
        };

        log::info!("开始批量更新 {} 个主题", items.len());

        let mut outcomes = Vec::with_capacity(items.len());
        for item in items {
            if cancel.is_cancelled() {
                log::info!(
                    "批量更新已取消，剩余 {} 个未处理",
                    items.len() - outcomes.len()
                );
                break;
            }
            outcomes.push(self.apply_one(item, cancel).await);
        }
        outcomes
    }

    async fn apply_one(&self, item: &UpdateItem, cancel: &CancellationToken) -> UpdateOutcome {
        match download_theme(&self.source, &self.themes_dir, item, cancel).await {
            Ok(()) => {
                self.lock().mark_updated(item);
                log::info!("主题 {} 已更新到 {}", item.name, item.new_version);
                UpdateOutcome::Updated {
                    name: item.name.clone(),
                    version: item.new_version.clone(),
                }
            }
            Err(e) if e.is_aborted() => {
                log::info!("主题 {} 的更新已取消", item.name);
                UpdateOutcome::Aborted {
                    name: item.name.clone(),
                }
            }
            Err(e) => {
                log::error!("更新主题 {} 失败: {}", item.name, e);
                UpdateOutcome::Failed {
                    name: item.name.clone(),
                    error: e.to_string(),
                }
            }
        }
    }

    fn begin(&self, next: u8) -> Result<FlightGuard<'_>, Activity> {
        match self
            .activity
            .compare_exchange(IDLE, next, Ordering::SeqCst, Ordering::SeqCst)
        {
            Ok(_) => Ok(FlightGuard {
                slot: &self.activity,
            }),
            Err(current) => Err(decode(current).unwrap_or(Activity::Applying)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, UpdaterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    fn seed(&self, state: UpdaterState) {
        *self.lock() = state;
    }
}

fn decode(code: u8) -> Option<Activity> {
    match code {
        CHECKING => Some(Activity::Checking),
        APPLYING => Some(Activity::Applying),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::fake::FakeSource;
    use std::fs;

    const NORD_MANIFEST: &str = r#"{"name":"Nord","version":"1.2.0","minAppVersion":"0.16.0"}"#;

    fn install(root: &Path, name: &str, version: &str) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("manifest.json"),
            format!(r#"{{"name":"{name}","version":"{version}"}}"#),
        )
        .unwrap();
        fs::write(dir.join("theme.css"), "/* old */").unwrap();
    }

    fn nord_source() -> FakeSource {
        FakeSource::new()
            .with_theme("Nord", "x/nord")
            .with_manifest("x/nord", NORD_MANIFEST)
            .with_stylesheet("x/nord", "/* nord 1.2.0 */")
    }

    fn item(name: &str, repo: &str) -> UpdateItem {
        UpdateItem {
            name: name.into(),
            current_version: "1.0.0".into(),
            new_version: "2.0.0".into(),
            min_app_version: String::new(),
            repo: repo.into(),
        }
    }

    #[tokio::test]
    async fn check_then_apply_nord() {
        let tmp = tempfile::tempdir().unwrap();
        install(tmp.path(), "Nord", "1.0.0");
        install(tmp.path(), "Minimal", "7.0.0");
        let updater = Updater::new(nord_source(), tmp.path().to_path_buf());

        let outcome = updater.check_for_updates().await;
        assert_eq!(outcome, CheckOutcome::Checked { installed: 2, updates: 1 });

        let pending = updater.pending();
        assert_eq!(pending[0].name, "Nord");
        assert_eq!(pending[0].current_version, "1.0.0");
        assert_eq!(pending[0].new_version, "1.2.0");
        assert_eq!(pending[0].repo, "x/nord");

        let outcome = updater.apply_update(&pending[0], &CancellationToken::new()).await;
        assert_eq!(
            outcome,
            UpdateOutcome::Updated {
                name: "Nord".into(),
                version: "1.2.0".into()
            }
        );

        let state = updater.snapshot();
        assert!(state.updates.is_empty());
        let versions: Vec<_> = state
            .themes
            .iter()
            .map(|t| (t.name.as_str(), t.version.as_str()))
            .collect();
        assert_eq!(versions, [("Minimal", "7.0.0"), ("Nord", "1.2.0")]);

        let dir = tmp.path().join("Nord");
        assert_eq!(fs::read_to_string(dir.join("manifest.json")).unwrap(), NORD_MANIFEST);
        assert_eq!(fs::read_to_string(dir.join("theme.css")).unwrap(), "/* nord 1.2.0 */");

        // 再检查一次不会再出现 Nord
        updater.check_for_updates().await;
        assert!(updater.pending().is_empty());
        assert_eq!(updater.activity(), None);
    }

    #[tokio::test]
    async fn apply_touches_only_the_matching_entries() {
        let tmp = tempfile::tempdir().unwrap();
        let source = FakeSource::new()
            .with_manifest("x/a", "{}")
            .with_stylesheet("x/a", "a");
        let updater = Updater::new(source, tmp.path().to_path_buf());
        let before = UpdaterState {
            themes: vec![
                VaultTheme {
                    name: "A".into(),
                    version: "1.0.0".into(),
                    min_app_version: String::new(),
                },
                VaultTheme {
                    name: "B".into(),
                    version: "1.0.0".into(),
                    min_app_version: String::new(),
                },
            ],
            updates: vec![item("A", "x/a"), item("B", "x/b")],
        };
        updater.seed(before.clone());

        updater.apply_update(&item("A", "x/a"), &CancellationToken::new()).await;

        let after = updater.snapshot();
        assert_eq!(after.updates, vec![item("B", "x/b")]);
        assert_eq!(after.themes[0].version, "2.0.0");
        assert_eq!(after.themes[1], before.themes[1]);
    }

    #[tokio::test]
    async fn failed_update_keeps_item_pending() {
        let tmp = tempfile::tempdir().unwrap();
        let updater = Updater::new(FakeSource::new(), tmp.path().to_path_buf());
        let state = UpdaterState {
            themes: Vec::new(),
            updates: vec![item("Gone", "x/gone")],
        };
        updater.seed(state.clone());

        let outcome = updater
            .apply_update(&item("Gone", "x/gone"), &CancellationToken::new())
            .await;

        assert!(matches!(outcome, UpdateOutcome::Failed { ref name, .. } if name == "Gone"));
        assert_eq!(updater.snapshot(), state);
    }

    #[tokio::test]
    async fn half_written_update_is_found_again() {
        let tmp = tempfile::tempdir().unwrap();
        install(tmp.path(), "Nord", "1.0.0");
        let css = tmp.path().join("Nord/theme.css");
        fs::remove_file(&css).unwrap();
        fs::create_dir(&css).unwrap();
        let updater = Updater::new(nord_source(), tmp.path().to_path_buf());
        updater.check_for_updates().await;
        let nord = updater.pending()[0].clone();

        let outcome = updater.apply_update(&nord, &CancellationToken::new()).await;
        assert!(matches!(outcome, UpdateOutcome::Failed { ref name, .. } if name == "Nord"));
        assert_eq!(updater.pending(), vec![nord.clone()]);

        updater.check_for_updates().await;
        assert_eq!(updater.pending(), vec![nord]);
    }

    #[tokio::test]
    async fn second_check_is_refused_while_one_runs() {
        let tmp = tempfile::tempdir().unwrap();
        install(tmp.path(), "Nord", "1.0.0");
        let updater = Updater::new(nord_source(), tmp.path().to_path_buf());
        let state = UpdaterState {
            themes: Vec::new(),
            updates: vec![item("A", "x/a")],
        };
        updater.seed(state.clone());
        let held = updater.begin(CHECKING).unwrap();

        let outcome = updater.check_for_updates().await;

        assert_eq!(outcome, CheckOutcome::Busy(Activity::Checking));
        assert_eq!(updater.snapshot(), state);
        assert_eq!(updater.activity(), Some(Activity::Checking));

        drop(held);
        assert_eq!(
            updater.check_for_updates().await,
            CheckOutcome::Checked { installed: 1, updates: 1 }
        );
    }

    #[tokio::test]
    async fn cancel_mid_update_leaves_state_alone() {
        let tmp = tempfile::tempdir().unwrap();
        install(tmp.path(), "Nord", "1.0.0");
        let source = nord_source().with_hanging_stylesheet("x/nord");
        let updater = Updater::new(source, tmp.path().to_path_buf());
        updater.check_for_updates().await;
        let before = updater.snapshot();
        let token = CancellationToken::new();
        let nord = before.updates[0].clone();

        let (outcome, (second, check)) = tokio::join!(updater.apply_update(&nord, &token), async {
            tokio::task::yield_now().await;
            let second = updater.apply_update(&nord, &token).await;
            let check = updater.check_for_updates().await;
            token.cancel();
            (second, check)
        });

        assert_eq!(outcome, UpdateOutcome::Aborted { name: "Nord".into() });
        assert_eq!(second, UpdateOutcome::Busy(Activity::Applying));
        assert_eq!(check, CheckOutcome::Busy(Activity::Applying));
        assert_eq!(updater.snapshot(), before);
        assert_eq!(
            fs::read_to_string(tmp.path().join("Nord/theme.css")).unwrap(),
            "/* old */"
        );
        assert_eq!(updater.activity(), None);
    }

    #[tokio::test]
    async fn apply_all_runs_in_order() {
        let tmp = tempfile::tempdir().unwrap();
        let source = FakeSource::new()
            .with_manifest("x/a", "{}")
            .with_stylesheet("x/a", "a")
            .with_manifest("x/c", "{}")
            .with_stylesheet("x/c", "c");
        let updater = Updater::new(source, tmp.path().to_path_buf());
        let items = vec![item("A", "x/a"), item("B", "x/b"), item("C", "x/c")];
        updater.seed(UpdaterState {
            themes: Vec::new(),
            updates: items.clone(),
        });

        let outcomes = updater.apply_all(&items, &CancellationToken::new()).await;

        assert_eq!(outcomes.len(), 3);
        assert!(matches!(outcomes[0], UpdateOutcome::Updated { ref name, .. } if name == "A"));
        assert!(matches!(outcomes[1], UpdateOutcome::Failed { ref name, .. } if name == "B"));
        assert!(matches!(outcomes[2], UpdateOutcome::Updated { ref name, .. } if name == "C"));
        assert_eq!(updater.pending(), vec![item("B", "x/b")]);
    }

    #[tokio::test]
    async fn cancelled_batch_stops_before_next_item() {
        let tmp = tempfile::tempdir().unwrap();
        let source = FakeSource::new()
            .with_manifest("x/a", "{}")
            .with_hanging_stylesheet("x/a")
            .with_manifest("x/b", "{}")
            .with_stylesheet("x/b", "b");
        let updater = Updater::new(source, tmp.path().to_path_buf());
        let items = vec![item("A", "x/a"), item("B", "x/b")];
        updater.seed(UpdaterState {
            themes: Vec::new(),
            updates: items.clone(),
        });
        let token = CancellationToken::new();

        let (outcomes, ()) = tokio::join!(updater.apply_all(&items, &token), async {
            tokio::task::yield_now().await;
            token.cancel();
        });

        assert_eq!(outcomes, vec![UpdateOutcome::Aborted { name: "A".into() }]);
        assert_eq!(updater.pending(), items);
        assert!(!tmp.path().join("B").exists());
    }

    #[tokio::test]
    async fn busy_batch_is_refused_whole() {
        let tmp = tempfile::tempdir().unwrap();
        let updater = Updater::new(FakeSource::new(), tmp.path().to_path_buf());
        let _held = updater.begin(CHECKING).unwrap();

        let outcomes = updater
            .apply_all(&[item("A", "x/a")], &CancellationToken::new())
            .await;

        assert_eq!(outcomes, vec![UpdateOutcome::Busy(Activity::Checking)]);
        assert_eq!(updater.activity(), Some(Activity::Checking));
    }
}
