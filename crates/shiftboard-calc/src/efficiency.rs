//! 效率計算：可用率與性能率
//!
//! 兩個比率分別輸出，綜合指標（例如 可用率 × 性能率）由呼叫端自行組合。

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shiftboard_core::{LineKey, ProductionRecord};
use std::collections::BTreeMap;

use crate::normalize::ProductCatalog;
use crate::percentage;

/// 效率統計
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EfficiencyReport {
    pub record_count: usize,

    /// 工作分鐘數
    pub worked_minutes: Decimal,

    /// 瓶頸停機分鐘數（排除計劃停機）
    pub bottleneck_downtime_minutes: u64,

    /// 可用率（0-100）
    pub availability: Decimal,

    /// 依實際工時換算的目標產量
    pub capacity_target: Decimal,

    /// 實際產量
    pub produced: Decimal,

    /// 性能率（百分比，不設上限）
    pub performance: Decimal,
}

/// 產線 × 班別效率
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineShiftEfficiency {
    pub line: LineKey,
    pub shift: String,
    pub report: EfficiencyReport,
}

/// 可用率 = (工作分鐘 - 瓶頸停機) / 工作分鐘 × 100，限制於 0-100
pub fn availability(worked_minutes: Decimal, bottleneck_downtime_minutes: u64) -> Decimal {
    if worked_minutes <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let uptime = worked_minutes.saturating_sub(Decimal::from(bottleneck_downtime_minutes));
    percentage(uptime, worked_minutes).clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
}

/// 性能率 = 產量 / 目標產量 × 100
pub fn performance(produced: Decimal, capacity_target: Decimal) -> Decimal {
    percentage(produced, capacity_target)
}

/// 效率計算器
pub struct EfficiencyCalculator<'a> {
    catalog: &'a ProductCatalog,
    nominal_shift_hours: Decimal,
}

impl<'a> EfficiencyCalculator<'a> {
    pub fn new(catalog: &'a ProductCatalog, nominal_shift_hours: Decimal) -> Self {
        Self {
            catalog,
            nominal_shift_hours,
        }
    }

    /// 紀錄的標準產能：優先使用報工快照，其次使用產品主檔
    fn record_capacity(&self, record: &ProductionRecord) -> Option<Decimal> {
        record.nominal_capacity.or_else(|| {
            self.catalog
                .product(&record.product)
                .filter(|p| p.has_capacity())
                .map(|p| p.nominal_capacity_per_8h)
        })
    }

    /// 單筆紀錄的目標產量（標準產能依工時線性換算）
    pub fn capacity_target(&self, record: &ProductionRecord) -> Decimal {
        if self.nominal_shift_hours <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        self.record_capacity(record)
            .and_then(|capacity| {
                capacity
                    .saturating_mul(record.hours_worked)
                    .checked_div(self.nominal_shift_hours)
            })
            .unwrap_or(Decimal::ZERO)
    }

    /// 計算效率（紀錄需已由呼叫端依產線/班別篩選）
    pub fn compute<'r, I>(&self, records: I) -> EfficiencyReport
    where
        I: IntoIterator<Item = &'r ProductionRecord>,
    {
        let mut record_count = 0;
        let mut worked_minutes = Decimal::ZERO;
        let mut bottleneck_downtime_minutes = 0u64;
        let mut capacity_target = Decimal::ZERO;
        let mut produced = Decimal::ZERO;

        for record in records {
            record_count += 1;
            worked_minutes = worked_minutes.saturating_add(record.worked_minutes());
            bottleneck_downtime_minutes =
                bottleneck_downtime_minutes.saturating_add(record.bottleneck_stop_minutes());
            capacity_target = capacity_target.saturating_add(self.capacity_target(record));
            produced = produced.saturating_add(record.quantity);
        }

        EfficiencyReport {
            record_count,
            worked_minutes,
            bottleneck_downtime_minutes,
            availability: availability(worked_minutes, bottleneck_downtime_minutes),
            capacity_target,
            produced,
            performance: performance(produced, capacity_target),
        }
    }

    /// 依產線與班別分組計算，班別不分大小寫並以大寫輸出
    pub fn by_line_and_shift<'r, I>(&self, records: I) -> Vec<LineShiftEfficiency>
    where
        I: IntoIterator<Item = &'r ProductionRecord>,
    {
        let mut grouped: BTreeMap<(LineKey, String), Vec<&ProductionRecord>> = BTreeMap::new();
        for record in records {
            grouped
                .entry((record.line.clone(), record.shift.to_ascii_uppercase()))
                .or_default()
                .push(record);
        }

        grouped
            .into_iter()
            .map(|((line, shift), group)| LineShiftEfficiency {
                line,
                shift,
                report: self.compute(group),
            })
            .collect()
    }
}
