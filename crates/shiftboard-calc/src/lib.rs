//! # Shiftboard Calculation Engine
//!
//! 生產看板計算引擎：正規化、庫存對帳、停機彙總、效率、週目標、訂單備貨

pub mod calculator;
pub mod classification;
pub mod downtime;
pub mod efficiency;
pub mod inventory;
pub mod normalize;
pub mod readiness;
pub mod snapshot;
pub mod weekly_goal;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// Re-export 主要類型
pub use calculator::{effective_config, MetricsCalculator};
pub use classification::{
    ClassificationRule, ClassificationTable, EquipmentCategory, ReasonCategory,
};
pub use downtime::{
    DowntimeAggregator, DowntimeBreakdown, DowntimeSummary, ParetoDimension, ParetoEntry, StopScope,
};
pub use efficiency::{EfficiencyCalculator, EfficiencyReport, LineShiftEfficiency};
pub use inventory::{
    InventoryReconciler, InventoryReport, LiveBalance, PackagingBreakdown, SnapshotBalance,
};
pub use normalize::{
    parse_duration, parse_time_of_day, resolve_line, resolve_product, Catalog, CatalogEntry,
    LineCatalog, Normalizer, ProductCatalog,
};
pub use readiness::{LineShortage, ReadinessMatcher, ReadinessReport};
pub use snapshot::{RawSnapshot, Snapshot};
pub use weekly_goal::{GoalStatus, WeeklyGoal, WeeklyGoalReport, WeeklyGoalTracker};

/// 百分比 = 分子 / 分母 × 100；分母非正數時為 0，超出 Decimal 範圍時飽和
pub fn percentage(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    numerator
        .checked_div(denominator)
        .map(|ratio| ratio.saturating_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(if numerator.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        })
}

/// 資料品質警告
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataQualityWarning {
    /// 問題對象（原始引用字串或集合名稱）
    pub subject: String,
    pub message: String,
    pub severity: WarningSeverity,
}

impl DataQualityWarning {
    pub fn new(subject: String, message: String, severity: WarningSeverity) -> Self {
        Self {
            subject,
            message,
            severity,
        }
    }

    pub fn info(subject: String, message: String) -> Self {
        Self::new(subject, message, WarningSeverity::Info)
    }

    pub fn warning(subject: String, message: String) -> Self {
        Self::new(subject, message, WarningSeverity::Warning)
    }

    pub fn error(subject: String, message: String) -> Self {
        Self::new(subject, message, WarningSeverity::Error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningSeverity {
    Info,
    Warning,
    Error,
}
