//! 停機彙總：總量、分類、柏拉圖排序與 MTTR

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shiftboard_core::{ProductionRecord, StopEvent, StopType};
use std::collections::BTreeMap;

use crate::classification::{ClassificationTable, EquipmentCategory, ReasonCategory};

/// 統計範圍
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopScope {
    /// 所有停機類型
    All,
    /// 排除計劃停機
    Bottleneck,
}

impl StopScope {
    fn includes(&self, stop: &StopEvent) -> bool {
        match self {
            StopScope::All => true,
            StopScope::Bottleneck => stop.stop_type.counts_as_bottleneck(),
        }
    }
}

/// 柏拉圖分組維度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParetoDimension {
    Equipment,
    EquipmentCategory,
    Reason,
    ReasonCategory,
    StopType,
}

/// 柏拉圖項目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParetoEntry {
    pub label: String,
    pub minutes: u64,
    pub stop_count: u64,
    /// 佔該範圍總停機的百分比
    pub percentage: Decimal,
    /// 累計百分比
    pub cumulative_percentage: Decimal,
}

/// 單一範圍的停機統計
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DowntimeSummary {
    pub total_minutes: u64,
    pub stop_count: u64,
    /// 平均修復時間（分鐘）
    pub mttr_minutes: Decimal,
    pub by_equipment: BTreeMap<String, u64>,
    pub by_category: BTreeMap<EquipmentCategory, u64>,
    pub by_reason: BTreeMap<String, u64>,
    pub by_reason_category: BTreeMap<ReasonCategory, u64>,
    pub pareto: Vec<ParetoEntry>,
}

/// 停機彙總結果
///
/// `raw` 包含所有停機類型，`bottleneck` 排除計劃停機，由呼叫端決定顯示哪一個。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DowntimeBreakdown {
    pub raw: DowntimeSummary,
    pub bottleneck: DowntimeSummary,
    pub by_stop_type: BTreeMap<StopType, u64>,
}

impl DowntimeBreakdown {
    pub fn raw_total(&self) -> u64 {
        self.raw.total_minutes
    }

    pub fn bottleneck_total(&self) -> u64 {
        self.bottleneck.total_minutes
    }
}

/// 平均修復時間，無停機時為 0
pub fn mttr(total_minutes: u64, stop_count: u64) -> Decimal {
    if stop_count == 0 {
        return Decimal::ZERO;
    }
    Decimal::from(total_minutes) / Decimal::from(stop_count)
}

/// 停機彙總器
#[derive(Debug, Clone)]
pub struct DowntimeAggregator {
    equipment_table: ClassificationTable<EquipmentCategory>,
    reason_table: ClassificationTable<ReasonCategory>,
    pareto_dimension: ParetoDimension,
}

impl Default for DowntimeAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl DowntimeAggregator {
    /// 使用預設分類表，柏拉圖依設備分類
    pub fn new() -> Self {
        Self {
            equipment_table: EquipmentCategory::default_table(),
            reason_table: ReasonCategory::default_table(),
            pareto_dimension: ParetoDimension::EquipmentCategory,
        }
    }

    /// 建構器模式：設置設備分類表
    pub fn with_equipment_table(mut self, table: ClassificationTable<EquipmentCategory>) -> Self {
        self.equipment_table = table;
        self
    }

    /// 建構器模式：設置原因分類表
    pub fn with_reason_table(mut self, table: ClassificationTable<ReasonCategory>) -> Self {
        self.reason_table = table;
        self
    }

    /// 建構器模式：設置柏拉圖維度
    pub fn with_pareto_dimension(mut self, dimension: ParetoDimension) -> Self {
        self.pareto_dimension = dimension;
        self
    }

    pub fn equipment_category(&self, equipment: &str) -> EquipmentCategory {
        self.equipment_table.classify(equipment)
    }

    /// 彙總停機（紀錄需已由呼叫端依日期/產線/班別篩選）
    pub fn aggregate<'a, I>(&self, records: I) -> DowntimeBreakdown
    where
        I: IntoIterator<Item = &'a ProductionRecord>,
    {
        let stops: Vec<&StopEvent> = records.into_iter().flat_map(|r| r.stops.iter()).collect();

        tracing::debug!("彙總停機事件: {} 筆", stops.len());

        let mut by_stop_type = BTreeMap::new();
        for stop in &stops {
            *by_stop_type.entry(stop.stop_type).or_insert(0) += u64::from(stop.minutes);
        }

        DowntimeBreakdown {
            raw: self.summarize_stops(&stops, StopScope::All),
            bottleneck: self.summarize_stops(&stops, StopScope::Bottleneck),
            by_stop_type,
        }
    }

    /// 單一範圍的統計
    pub fn summarize<'a, I>(&self, records: I, scope: StopScope) -> DowntimeSummary
    where
        I: IntoIterator<Item = &'a ProductionRecord>,
    {
        let stops: Vec<&StopEvent> = records.into_iter().flat_map(|r| r.stops.iter()).collect();
        self.summarize_stops(&stops, scope)
    }

    /// 指定維度的柏拉圖
    pub fn pareto<'a, I>(
        &self,
        records: I,
        scope: StopScope,
        dimension: ParetoDimension,
    ) -> Vec<ParetoEntry>
    where
        I: IntoIterator<Item = &'a ProductionRecord>,
    {
        let stops: Vec<&StopEvent> = records
            .into_iter()
            .flat_map(|r| r.stops.iter())
            .filter(|s| scope.includes(s))
            .collect();
        self.pareto_of(&stops, dimension)
    }

    fn summarize_stops(&self, stops: &[&StopEvent], scope: StopScope) -> DowntimeSummary {
        let selected: Vec<&StopEvent> =
            stops.iter().copied().filter(|s| scope.includes(s)).collect();

        let mut by_equipment = BTreeMap::new();
        let mut by_category = BTreeMap::new();
        let mut by_reason = BTreeMap::new();
        let mut by_reason_category = BTreeMap::new();
        let mut total_minutes = 0u64;

        for stop in &selected {
            let minutes = u64::from(stop.minutes);
            total_minutes += minutes;
            *by_equipment.entry(stop.equipment.clone()).or_insert(0) += minutes;
            *by_category
                .entry(self.equipment_table.classify(&stop.equipment))
                .or_insert(0) += minutes;
            *by_reason.entry(stop.reason.clone()).or_insert(0) += minutes;
            *by_reason_category
                .entry(self.reason_table.classify(&stop.reason))
                .or_insert(0) += minutes;
        }

        let stop_count = selected.len() as u64;

        DowntimeSummary {
            total_minutes,
            stop_count,
            mttr_minutes: mttr(total_minutes, stop_count),
            by_equipment,
            by_category,
            by_reason,
            by_reason_category,
            pareto: self.pareto_of(&selected, self.pareto_dimension),
        }
    }

    fn dimension_label(&self, stop: &StopEvent, dimension: ParetoDimension) -> String {
        match dimension {
            ParetoDimension::Equipment => stop.equipment.clone(),
            ParetoDimension::EquipmentCategory => {
                self.equipment_table.classify(&stop.equipment).as_str().to_string()
            }
            ParetoDimension::Reason => stop.reason.clone(),
            ParetoDimension::ReasonCategory => {
                self.reason_table.classify(&stop.reason).as_str().to_string()
            }
            ParetoDimension::StopType => stop.stop_type.as_str().to_string(),
        }
    }

    /// 依分鐘數遞減排序，同分依標籤排序
    fn pareto_of(&self, stops: &[&StopEvent], dimension: ParetoDimension) -> Vec<ParetoEntry> {
        let mut grouped: BTreeMap<String, (u64, u64)> = BTreeMap::new();
        for stop in stops {
            let slot = grouped.entry(self.dimension_label(stop, dimension)).or_insert((0, 0));
            slot.0 += u64::from(stop.minutes);
            slot.1 += 1;
        }

        let total: u64 = grouped.values().map(|(minutes, _)| minutes).sum();

        let mut ranked: Vec<(String, u64, u64)> = grouped
            .into_iter()
            .map(|(label, (minutes, count))| (label, minutes, count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let hundred = Decimal::from(100);
        let mut cumulative = 0u64;
        ranked
            .into_iter()
            .map(|(label, minutes, stop_count)| {
                cumulative += minutes;
                let (percentage, cumulative_percentage) = if total == 0 {
                    (Decimal::ZERO, Decimal::ZERO)
                } else {
                    (
                        Decimal::from(minutes) * hundred / Decimal::from(total),
                        Decimal::from(cumulative) * hundred / Decimal::from(total),
                    )
                };
                ParetoEntry {
                    label,
                    minutes,
                    stop_count,
                    percentage,
                    cumulative_percentage,
                }
            })
            .collect()
    }
}
