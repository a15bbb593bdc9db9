//! 版本化快照存放
//!
//! 每次刷新先領取遞增的票號再取資料，完成時只有票號比已套用者新才會替換快照。
//! 較舊的結果直接丟棄。取資料期間不持有鎖，讀取端持續看到前一份快照。

use shiftboard_calc::{effective_config, Snapshot};
use shiftboard_core::EngineConfig;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::data_store::{fetch_all, DataStore};

/// 刷新結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// 已替換為新版本
    Applied { version: u64 },
    /// 已有更新的刷新先完成，結果被丟棄
    Stale { ticket: u64 },
    /// 取資料失敗，保留原快照
    Failed { ticket: u64, error: String },
}

impl RefreshOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, RefreshOutcome::Applied { .. })
    }
}

/// 帶版本號的快照
#[derive(Debug, Clone)]
pub struct VersionedSnapshot {
    pub version: u64,
    pub snapshot: Arc<Snapshot>,
}

#[derive(Debug)]
struct Current {
    version: u64,
    applied_ticket: u64,
    snapshot: Arc<Snapshot>,
}

/// 快照存放
#[derive(Debug)]
pub struct SnapshotStore {
    config: EngineConfig,
    current: RwLock<Current>,
    next_ticket: AtomicU64,
}

impl SnapshotStore {
    /// 以空快照（版本 0）開始，不合法的配置改用預設值
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config: effective_config(config),
            current: RwLock::new(Current {
                version: 0,
                applied_ticket: 0,
                snapshot: Arc::new(Snapshot::empty()),
            }),
            next_ticket: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// 目前的快照與版本
    pub fn current(&self) -> VersionedSnapshot {
        let current = self.current.read().unwrap_or_else(PoisonError::into_inner);
        VersionedSnapshot {
            version: current.version,
            snapshot: Arc::clone(&current.snapshot),
        }
    }

    pub fn version(&self) -> u64 {
        self.current.read().unwrap_or_else(PoisonError::into_inner).version
    }

    /// 從資料來源刷新
    pub async fn refresh(&self, store: &dyn DataStore) -> RefreshOutcome {
        let ticket = self.next_ticket.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!("刷新快照：票號 {}", ticket);

        match fetch_all(store).await {
            Ok(raw) => self.install(ticket, Snapshot::from_raw(raw, &self.config)),
            Err(e) => {
                tracing::warn!(
                    "刷新快照失敗（票號 {}），沿用版本 {}: {}",
                    ticket,
                    self.version(),
                    e
                );
                RefreshOutcome::Failed {
                    ticket,
                    error: e.to_string(),
                }
            }
        }
    }

    /// 直接套用已正規化的快照
    pub fn replace(&self, snapshot: Snapshot) -> RefreshOutcome {
        let ticket = self.next_ticket.fetch_add(1, Ordering::SeqCst) + 1;
        self.install(ticket, snapshot)
    }

    fn install(&self, ticket: u64, snapshot: Snapshot) -> RefreshOutcome {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);

        if ticket <= current.applied_ticket {
            tracing::debug!(
                "丟棄過期快照：票號 {} 早於已套用的 {}",
                ticket,
                current.applied_ticket
            );
            return RefreshOutcome::Stale { ticket };
        }

        current.applied_ticket = ticket;
        current.version += 1;
        current.snapshot = Arc::new(snapshot);

        tracing::info!("快照已更新至版本 {}（票號 {}）", current.version, ticket);
        RefreshOutcome::Applied {
            version: current.version,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_store::InMemoryDataStore;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use shiftboard_calc::RawSnapshot;
    use shiftboard_core::{Line, Product, RawOrder, RawProductionRecord, RawWeeklyPlanEntry, Result};
    use tokio::sync::Notify;

    fn raw(product_id: &str) -> RawSnapshot {
        RawSnapshot {
            products: vec![Product::new(product_id, product_id, Decimal::from(1000))],
            ..RawSnapshot::default()
        }
    }

    fn product_id(snapshot: &Snapshot) -> String {
        snapshot.products().iter().next().map(|p| p.id.clone()).unwrap_or_default()
    }

    /// 取產品時先通知已進入，再等待放行
    struct GatedStore {
        inner: InMemoryDataStore,
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl DataStore for GatedStore {
        async fn fetch_products(&self) -> Result<Vec<Product>> {
            self.entered.notify_one();
            self.release.notified().await;
            self.inner.fetch_products().await
        }

        async fn fetch_lines(&self) -> Result<Vec<Line>> {
            self.inner.fetch_lines().await
        }

        async fn fetch_orders(&self) -> Result<Vec<RawOrder>> {
            self.inner.fetch_orders().await
        }

        async fn fetch_production_records(&self) -> Result<Vec<RawProductionRecord>> {
            self.inner.fetch_production_records().await
        }

        async fn fetch_weekly_plan(&self) -> Result<Vec<RawWeeklyPlanEntry>> {
            self.inner.fetch_weekly_plan().await
        }
    }

    #[tokio::test]
    async fn test_initial_snapshot_is_empty() {
        let store = SnapshotStore::new(EngineConfig::default());
        let current = store.current();

        assert_eq!(current.version, 0);
        assert!(current.snapshot.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_config_replaced_by_default() {
        let config = EngineConfig::default().with_default_hours_worked(Decimal::ZERO);
        let store = SnapshotStore::new(config);

        assert_eq!(store.config(), &EngineConfig::default());
    }

    #[tokio::test]
    async fn test_refresh_applies_new_version() {
        let store = SnapshotStore::new(EngineConfig::default());
        let source = InMemoryDataStore::new(raw("SKU-001"));

        assert_eq!(store.refresh(&source).await, RefreshOutcome::Applied { version: 1 });
        assert_eq!(product_id(&store.current().snapshot), "SKU-001");

        source.replace(raw("SKU-002"));
        assert_eq!(store.refresh(&source).await, RefreshOutcome::Applied { version: 2 });
        assert_eq!(product_id(&store.current().snapshot), "SKU-002");
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_snapshot() {
        let store = SnapshotStore::new(EngineConfig::default());
        let source = InMemoryDataStore::new(raw("SKU-001"));
        store.refresh(&source).await;

        source.set_failing(true);
        let outcome = store.refresh(&source).await;

        assert!(matches!(outcome, RefreshOutcome::Failed { ticket: 2, .. }));
        assert_eq!(store.version(), 1);
        assert_eq!(product_id(&store.current().snapshot), "SKU-001");
    }

    #[tokio::test]
    async fn test_first_load_failure_stays_empty() {
        let store = SnapshotStore::new(EngineConfig::default());
        let source = InMemoryDataStore::default();
        source.set_failing(true);

        assert!(!store.refresh(&source).await.is_applied());
        assert!(store.current().snapshot.is_empty());
    }

    #[tokio::test]
    async fn test_older_refresh_finishing_late_is_discarded() {
        let store = SnapshotStore::new(EngineConfig::default());
        let slow = GatedStore {
            inner: InMemoryDataStore::new(raw("OLD")),
            entered: Notify::new(),
            release: Notify::new(),
        };
        let fast = InMemoryDataStore::new(raw("NEW"));

        let (older, newer) = tokio::join!(store.refresh(&slow), async {
            slow.entered.notified().await;
            // 舊刷新進行中，讀取端仍看到版本 0
            assert_eq!(store.version(), 0);
            let outcome = store.refresh(&fast).await;
            slow.release.notify_one();
            outcome
        });

        assert_eq!(newer, RefreshOutcome::Applied { version: 1 });
        assert_eq!(older, RefreshOutcome::Stale { ticket: 1 });
        assert_eq!(store.version(), 1);
        assert_eq!(product_id(&store.current().snapshot), "NEW");
    }

    #[tokio::test]
    async fn test_replace_bumps_version() {
        let store = SnapshotStore::new(EngineConfig::default());

        assert_eq!(store.replace(Snapshot::empty()), RefreshOutcome::Applied { version: 1 });
        assert_eq!(store.version(), 1);
    }
}
