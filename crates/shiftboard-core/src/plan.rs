//! 週計劃模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::product::ProductKey;

/// 週計劃明細
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyPlanEntry {
    /// 產品
    pub product: ProductKey,

    /// 目標日期（週一至週日）
    pub target_day: NaiveDate,

    /// 計劃數量
    pub planned_quantity: Decimal,
}

impl WeeklyPlanEntry {
    pub fn new(product: ProductKey, target_day: NaiveDate, planned_quantity: Decimal) -> Self {
        Self {
            product,
            target_day,
            planned_quantity,
        }
    }
}
