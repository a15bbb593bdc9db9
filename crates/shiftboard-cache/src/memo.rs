//! 依快照版本的計算結果快取
//!
//! 快照不可變，所以同一版本的結果可以直接重用；版本前進時整批作廢。
//! 比快取舊的版本只計算不寫入，不會覆蓋較新的結果。

use chrono::NaiveDate;
use shiftboard_calc::{InventoryReport, WeeklyGoalReport};
use std::collections::HashMap;
use std::sync::Arc;

/// 指標快取
#[derive(Debug, Default)]
pub struct MetricsMemo {
    version: Option<u64>,
    inventory: Option<Arc<InventoryReport>>,
    weekly_goals: HashMap<NaiveDate, Arc<WeeklyGoalReport>>,
}

impl MetricsMemo {
    pub fn new() -> Self {
        Self::default()
    }

    /// 對齊版本，較新版本清除所有結果；版本比快取舊時回傳 false
    fn sync(&mut self, version: u64) -> bool {
        match self.version {
            Some(cached) if version < cached => {
                tracing::debug!("略過舊版本 {} 的快取（目前 {}）", version, cached);
                false
            }
            Some(cached) if version == cached => true,
            previous => {
                if let Some(previous) = previous {
                    tracing::debug!("快取作廢：版本 {} → {}", previous, version);
                }
                self.clear();
                self.version = Some(version);
                true
            }
        }
    }

    /// 取得或計算庫存報告
    pub fn inventory_or_insert_with<F>(&mut self, version: u64, compute: F) -> Arc<InventoryReport>
    where
        F: FnOnce() -> InventoryReport,
    {
        if !self.sync(version) {
            return Arc::new(compute());
        }
        Arc::clone(self.inventory.get_or_insert_with(|| Arc::new(compute())))
    }

    /// 取得或計算指定日期的週目標
    pub fn weekly_goals_or_insert_with<F>(
        &mut self,
        version: u64,
        today: NaiveDate,
        compute: F,
    ) -> Arc<WeeklyGoalReport>
    where
        F: FnOnce() -> WeeklyGoalReport,
    {
        if !self.sync(version) {
            return Arc::new(compute());
        }
        Arc::clone(
            self.weekly_goals
                .entry(today)
                .or_insert_with(|| Arc::new(compute())),
        )
    }

    /// 檢查版本是否已有庫存報告
    pub fn has_inventory(&self, version: u64) -> bool {
        self.version == Some(version) && self.inventory.is_some()
    }

    pub fn cached_version(&self) -> Option<u64> {
        self.version
    }

    /// 清除所有結果
    pub fn clear(&mut self) {
        self.inventory = None;
        self.weekly_goals.clear();
    }
}
