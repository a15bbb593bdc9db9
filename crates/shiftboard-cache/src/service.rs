//! 看板查詢服務
//!
//! 所有查詢都讀取目前的快照版本，產品與產線引用可使用 ID 或名稱。

use chrono::NaiveDate;
use rust_decimal::Decimal;
use shiftboard_calc::{
    DataQualityWarning, DowntimeAggregator, DowntimeBreakdown, EfficiencyReport, InventoryReport,
    LiveBalance, MetricsCalculator, ReadinessMatcher, ReadinessReport, Snapshot, SnapshotBalance,
    WeeklyGoalReport,
};
use shiftboard_core::{DateRange, EngineConfig, ProductKey, RecordFilter};
use std::sync::{Arc, Mutex, PoisonError};
use uuid::Uuid;

use crate::data_store::DataStore;
use crate::memo::MetricsMemo;
use crate::snapshot_store::{RefreshOutcome, SnapshotStore, VersionedSnapshot};

/// 看板服務
#[derive(Debug)]
pub struct DashboardService {
    store: SnapshotStore,
    calculator: MetricsCalculator,
    memo: Mutex<MetricsMemo>,
}

impl Default for DashboardService {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl DashboardService {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            store: SnapshotStore::new(config.clone()),
            calculator: MetricsCalculator::new(config),
            memo: Mutex::new(MetricsMemo::new()),
        }
    }

    /// 建構器模式：自訂停機分類
    pub fn with_downtime_aggregator(mut self, aggregator: DowntimeAggregator) -> Self {
        self.calculator = self.calculator.with_downtime_aggregator(aggregator);
        self
    }

    /// 從資料來源刷新快照
    pub async fn refresh(&self, data_store: &dyn DataStore) -> RefreshOutcome {
        self.store.refresh(data_store).await
    }

    /// 直接載入已正規化的快照
    pub fn load(&self, snapshot: Snapshot) -> RefreshOutcome {
        self.store.replace(snapshot)
    }

    pub fn snapshot_version(&self) -> u64 {
        self.store.version()
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.store.current().snapshot
    }

    pub fn warnings(&self) -> Vec<DataQualityWarning> {
        self.snapshot().warnings().to_vec()
    }

    fn memo(&self) -> std::sync::MutexGuard<'_, MetricsMemo> {
        self.memo.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 目前版本的庫存報告
    pub fn inventory(&self) -> Arc<InventoryReport> {
        let current = self.store.current();
        self.inventory_for(&current)
    }

    fn inventory_for(&self, current: &VersionedSnapshot) -> Arc<InventoryReport> {
        self.memo().inventory_or_insert_with(current.version, || {
            self.calculator.inventory(&current.snapshot)
        })
    }

    fn product_key(snapshot: &Snapshot, product_ref: &str) -> ProductKey {
        snapshot.products().resolve(product_ref)
    }

    /// 即時庫存
    pub fn get_stock(&self, product_ref: &str) -> Decimal {
        let current = self.store.current();
        let key = Self::product_key(&current.snapshot, product_ref);
        self.inventory_for(&current).stock(&key)
    }

    /// 待出貨需求
    pub fn get_pending_demand(&self, product_ref: &str) -> Decimal {
        let current = self.store.current();
        let key = Self::product_key(&current.snapshot, product_ref);
        self.inventory_for(&current).pending_demand(&key)
    }

    /// 預估餘量（即時庫存 - 待出貨需求）
    pub fn get_forecast(&self, product_ref: &str) -> Decimal {
        let current = self.store.current();
        let key = Self::product_key(&current.snapshot, product_ref);
        self.inventory_for(&current).forecast(&key)
    }

    pub fn get_live_balance(&self, product_ref: &str) -> Option<LiveBalance> {
        let current = self.store.current();
        let key = Self::product_key(&current.snapshot, product_ref);
        self.inventory_for(&current).live_balance(&key).cloned()
    }

    /// 快照結存（以標準產能比例為期初庫存）
    pub fn get_snapshot_balance(&self, product_ref: &str) -> Option<SnapshotBalance> {
        let current = self.store.current();
        let key = Self::product_key(&current.snapshot, product_ref);
        self.inventory_for(&current).snapshot_balance(&key).cloned()
    }

    /// 即時結存告急的產品
    pub fn get_critical_products(&self) -> Vec<LiveBalance> {
        self.inventory().critical_live().into_iter().cloned().collect()
    }

    fn line_filter(
        snapshot: &Snapshot,
        line_ref: &str,
        range: DateRange,
        shift: Option<&str>,
    ) -> RecordFilter {
        let line_id = snapshot.lines().resolve(line_ref).label().to_string();
        let filter = RecordFilter::all().with_range(range).with_line(line_id);
        match shift {
            Some(shift) => filter.with_shift(shift),
            None => filter,
        }
    }

    /// 產線效率（可用率與性能率）
    pub fn get_line_efficiency(
        &self,
        line_ref: &str,
        range: DateRange,
        shift: Option<&str>,
    ) -> EfficiencyReport {
        let snapshot = self.snapshot();
        let filter = Self::line_filter(&snapshot, line_ref, range, shift);
        self.calculator.efficiency(&snapshot, &filter)
    }

    /// 產線可用率（0-100）
    pub fn get_line_availability(
        &self,
        line_ref: &str,
        range: DateRange,
        shift: Option<&str>,
    ) -> Decimal {
        self.get_line_efficiency(line_ref, range, shift).availability
    }

    /// 產線性能率（百分比）
    pub fn get_line_performance(
        &self,
        line_ref: &str,
        range: DateRange,
        shift: Option<&str>,
    ) -> Decimal {
        self.get_line_efficiency(line_ref, range, shift).performance
    }

    /// 停機彙總，可選擇單一產線
    pub fn get_downtime_breakdown(
        &self,
        range: DateRange,
        line_ref: Option<&str>,
    ) -> DowntimeBreakdown {
        let snapshot = self.snapshot();
        let filter = match line_ref {
            Some(line_ref) => {
                let line_id = snapshot.lines().resolve(line_ref).label().to_string();
                RecordFilter::all().with_range(range).with_line(line_id)
            }
            None => RecordFilter::all().with_range(range),
        };
        self.calculator.downtime(&snapshot, &filter)
    }

    /// `today` 所在週的週目標
    pub fn get_weekly_goal_status(&self, today: NaiveDate) -> Arc<WeeklyGoalReport> {
        let current = self.store.current();
        self.memo().weekly_goals_or_insert_with(current.version, today, || {
            self.calculator.weekly_goals(&current.snapshot, today)
        })
    }

    /// 訂單是否可由即時庫存出貨，找不到訂單時為 false
    pub fn is_order_ready(&self, order_id: &Uuid) -> bool {
        self.get_order_readiness(order_id)
            .map(|report| report.ready)
            .unwrap_or(false)
    }

    pub fn get_order_readiness(&self, order_id: &Uuid) -> Option<ReadinessReport> {
        let current = self.store.current();
        let inventory = self.inventory_for(&current);
        self.calculator.readiness(&current.snapshot, &inventory, order_id)
    }

    /// 所有未出貨訂單的備貨狀態
    pub fn get_backlog(&self) -> Vec<ReadinessReport> {
        let current = self.store.current();
        let inventory = self.inventory_for(&current);
        ReadinessMatcher::new(&inventory).backlog(current.snapshot.orders())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_store::InMemoryDataStore;
    use rstest::rstest;
    use shiftboard_calc::RawSnapshot;
    use shiftboard_core::{
        Line, OrderStatus, Product, RawOrder, RawProductionRecord, RawStopEvent, RawWeeklyPlanEntry,
    };

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, d).unwrap()
    }

    fn raw() -> RawSnapshot {
        RawSnapshot {
            products: vec![Product::new("SKU-001", "Water 500ml", Decimal::from(7200))],
            lines: vec![Line::new("L1", "Line 1")],
            orders: vec![
                RawOrder::new("ACME", day(10), OrderStatus::Pending)
                    .with_line("SKU-001", Decimal::from(300)),
                RawOrder::new("Globex", day(2), OrderStatus::Finalized)
                    .with_line("Water 500ml", Decimal::from(200)),
            ],
            records: vec![
                RawProductionRecord::new(day(3), "A", "Line 1", "SKU-001", Decimal::from(1000))
                    .with_stops(vec![RawStopEvent::with_duration(48u32).at("Filler 2", "Jam")]),
            ],
            weekly_plan: vec![RawWeeklyPlanEntry::new("SKU-001", day(3), Decimal::from(2000))],
        }
    }

    async fn service() -> DashboardService {
        let service = DashboardService::default();
        service.refresh(&InMemoryDataStore::new(raw())).await;
        service
    }

    #[tokio::test]
    async fn test_stock_views_resolve_by_id_or_name() {
        let service = service().await;

        assert_eq!(service.get_stock("SKU-001"), Decimal::from(800));
        assert_eq!(service.get_stock("Water 500ml"), Decimal::from(800));
        assert_eq!(service.get_pending_demand("SKU-001"), Decimal::from(300));
        assert_eq!(service.get_forecast("SKU-001"), Decimal::from(500));
        assert_eq!(service.get_stock("Unknown"), Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_snapshot_balance() {
        let service = service().await;
        let balance = service.get_snapshot_balance("SKU-001").unwrap();

        assert_eq!(balance.seed_stock, Decimal::from(1080));
        assert_eq!(balance.forecast, Decimal::from(780));
        assert!(service.get_snapshot_balance("Unknown").is_none());
    }

    #[tokio::test]
    async fn test_invalid_config_uses_default_seed() {
        let config = EngineConfig::default().with_snapshot_seed_fraction(Decimal::new(-5, 1));
        let service = DashboardService::new(config);
        service.refresh(&InMemoryDataStore::new(raw())).await;

        let balance = service.get_snapshot_balance("SKU-001").unwrap();
        assert_eq!(balance.seed_stock, Decimal::from(1080));
        assert_eq!(balance.forecast, Decimal::from(780));
    }

    #[tokio::test]
    async fn test_line_views() {
        let service = service().await;
        let range = DateRange::single_day(day(3));

        assert_eq!(service.get_line_availability("L1", range, None), Decimal::from(90));
        assert_eq!(service.get_line_availability("Line 1", range, Some("a")), Decimal::from(90));
        assert_eq!(service.get_line_availability("L1", range, Some("B")), Decimal::ZERO);
        assert_eq!(
            service.get_line_performance("L1", range, None).round_dp(2),
            Decimal::new(1389, 2)
        );
        assert_eq!(service.get_downtime_breakdown(range, Some("L1")).bottleneck_total(), 48);
        assert_eq!(service.get_downtime_breakdown(range, None).raw_total(), 48);
    }

    #[rstest]
    #[case(None, 90)]
    #[case(Some("A"), 90)]
    #[case(Some("a"), 90)]
    #[case(Some("B"), 0)]
    #[tokio::test]
    async fn test_availability_by_shift(#[case] shift: Option<&str>, #[case] expected: i64) {
        let service = service().await;
        let range = DateRange::new(day(3), day(9)).unwrap();

        assert_eq!(service.get_line_availability("L1", range, shift), Decimal::from(expected));
    }

    #[tokio::test]
    async fn test_order_readiness() {
        let service = service().await;
        let order_id = service.snapshot().orders()[0].id;

        assert!(service.is_order_ready(&order_id));
        assert!(!service.is_order_ready(&Uuid::new_v4()));
        assert_eq!(service.get_backlog().len(), 1);
    }

    #[tokio::test]
    async fn test_weekly_goal_memoized_per_version() {
        let service = service().await;

        let first = service.get_weekly_goal_status(day(5));
        let second = service.get_weekly_goal_status(day(5));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.goals[0].progress, Decimal::from(50));

        service.refresh(&InMemoryDataStore::new(raw())).await;
        let third = service.get_weekly_goal_status(day(5));
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(*first, *third);
    }

    #[tokio::test]
    async fn test_reads_before_first_load() {
        let service = DashboardService::default();

        assert_eq!(service.snapshot_version(), 0);
        assert_eq!(service.get_stock("SKU-001"), Decimal::ZERO);
        assert!(service.get_weekly_goal_status(day(5)).goals.is_empty());
    }
}
