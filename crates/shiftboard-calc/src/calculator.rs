//! 看板指標主計算器

use chrono::NaiveDate;
use shiftboard_core::{EngineConfig, RecordFilter};
use uuid::Uuid;

use crate::downtime::{
    DowntimeAggregator, DowntimeBreakdown, ParetoDimension, ParetoEntry, StopScope,
};
use crate::efficiency::{EfficiencyCalculator, EfficiencyReport, LineShiftEfficiency};
use crate::inventory::{InventoryReconciler, InventoryReport};
use crate::readiness::{ReadinessMatcher, ReadinessReport};
use crate::snapshot::Snapshot;
use crate::weekly_goal::{WeeklyGoalReport, WeeklyGoalTracker};
use crate::DataQualityWarning;

/// 一次完整計算的結果
#[derive(Debug, Clone)]
pub struct DashboardMetrics {
    pub inventory: InventoryReport,
    pub downtime: DowntimeBreakdown,
    pub efficiency: Vec<LineShiftEfficiency>,
    pub weekly_goals: WeeklyGoalReport,
    /// 未出貨訂單的備貨狀態（依交期排序）
    pub backlog: Vec<ReadinessReport>,
    pub warnings: Vec<DataQualityWarning>,

    /// 計算耗時（毫秒）
    pub calculation_time_ms: Option<u128>,
}

/// 指標計算器
///
/// 所有方法都是快照的純函數，同一份快照重複計算結果相同。
#[derive(Debug, Clone)]
pub struct MetricsCalculator {
    config: EngineConfig,
    downtime: DowntimeAggregator,
}

impl Default for MetricsCalculator {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

/// 驗證配置，不合法時記錄警告並改用預設值
pub fn effective_config(config: EngineConfig) -> EngineConfig {
    match config.validate() {
        Ok(()) => config,
        Err(e) => {
            tracing::warn!("配置無效，改用預設值: {}", e);
            EngineConfig::default()
        }
    }
}

impl MetricsCalculator {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config: effective_config(config),
            downtime: DowntimeAggregator::new(),
        }
    }

    /// 建構器模式：替換停機彙總器（自訂分類表或柏拉圖維度）
    pub fn with_downtime_aggregator(mut self, aggregator: DowntimeAggregator) -> Self {
        self.downtime = aggregator;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// 庫存對帳（即時結存與快照結存）
    pub fn inventory(&self, snapshot: &Snapshot) -> InventoryReport {
        InventoryReconciler::new(snapshot.products(), self.config.snapshot_seed_fraction)
            .reconcile(snapshot.records(), snapshot.orders())
    }

    /// 停機彙總
    pub fn downtime(&self, snapshot: &Snapshot, filter: &RecordFilter) -> DowntimeBreakdown {
        self.downtime.aggregate(snapshot.records_matching(filter))
    }

    /// 指定維度的停機柏拉圖
    pub fn pareto(
        &self,
        snapshot: &Snapshot,
        filter: &RecordFilter,
        scope: StopScope,
        dimension: ParetoDimension,
    ) -> Vec<ParetoEntry> {
        self.downtime.pareto(snapshot.records_matching(filter), scope, dimension)
    }

    /// 篩選範圍內的合併效率
    pub fn efficiency(&self, snapshot: &Snapshot, filter: &RecordFilter) -> EfficiencyReport {
        self.efficiency_calculator(snapshot)
            .compute(snapshot.records_matching(filter))
    }

    /// 依產線與班別分組的效率
    pub fn efficiency_by_line_and_shift(
        &self,
        snapshot: &Snapshot,
        filter: &RecordFilter,
    ) -> Vec<LineShiftEfficiency> {
        self.efficiency_calculator(snapshot)
            .by_line_and_shift(snapshot.records_matching(filter))
    }

    fn efficiency_calculator<'a>(&self, snapshot: &'a Snapshot) -> EfficiencyCalculator<'a> {
        EfficiencyCalculator::new(snapshot.products(), self.config.nominal_shift_hours)
    }

    /// `today` 所在週的週目標
    pub fn weekly_goals(&self, snapshot: &Snapshot, today: NaiveDate) -> WeeklyGoalReport {
        WeeklyGoalTracker::new(&self.config).track(
            snapshot.weekly_plan(),
            snapshot.records(),
            today,
        )
    }

    /// 單一訂單的備貨檢查，找不到訂單時為 None
    pub fn readiness(
        &self,
        snapshot: &Snapshot,
        inventory: &InventoryReport,
        order_id: &Uuid,
    ) -> Option<ReadinessReport> {
        snapshot
            .order(order_id)
            .map(|order| ReadinessMatcher::new(inventory).evaluate(order))
    }

    /// 所有未出貨訂單的備貨檢查
    pub fn backlog(
        &self,
        snapshot: &Snapshot,
        inventory: &InventoryReport,
    ) -> Vec<ReadinessReport> {
        ReadinessMatcher::new(inventory).backlog(snapshot.orders())
    }

    /// 完整計算入口
    pub fn calculate(&self, snapshot: &Snapshot, today: NaiveDate) -> DashboardMetrics {
        tracing::info!(
            "開始看板計算：生產紀錄 {} 筆，訂單 {} 筆，週計劃 {} 筆",
            snapshot.records().len(),
            snapshot.orders().len(),
            snapshot.weekly_plan().len()
        );

        let start_time = std::time::Instant::now();
        let everything = RecordFilter::all();

        tracing::debug!("Step 1: 庫存對帳");
        let inventory = self.inventory(snapshot);

        tracing::debug!("Step 2: 停機彙總");
        let downtime = self.downtime(snapshot, &everything);

        tracing::debug!("Step 3: 產線效率");
        let efficiency = self.efficiency_by_line_and_shift(snapshot, &everything);

        tracing::debug!("Step 4: 週目標");
        let weekly_goals = self.weekly_goals(snapshot, today);

        tracing::debug!("Step 5: 訂單備貨");
        let backlog = self.backlog(snapshot, &inventory);

        let metrics = DashboardMetrics {
            inventory,
            downtime,
            efficiency,
            weekly_goals,
            backlog,
            warnings: snapshot.warnings().to_vec(),
            calculation_time_ms: Some(start_time.elapsed().as_millis()),
        };

        tracing::info!("看板計算完成，耗時 {:?}", start_time.elapsed());
        tracing::info!(
            "即時告急產品 {} 項，未出貨訂單 {} 筆",
            metrics.inventory.critical_live().len(),
            metrics.backlog.len()
        );

        metrics
    }
}
