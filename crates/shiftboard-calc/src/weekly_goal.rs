//! 週目標追蹤

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shiftboard_core::{EngineConfig, ProductKey, ProductionRecord, WeekWindow, WeeklyPlanEntry};
use std::collections::BTreeMap;

use crate::percentage;

/// 週目標狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GoalStatus {
    Completed,
    Late,
    InProgress,
}

/// 單一產品的週目標
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyGoal {
    pub product: ProductKey,
    pub planned: Decimal,
    pub actual: Decimal,
    /// 進度百分比
    pub progress: Decimal,
    pub status: GoalStatus,
}

/// 週目標報告（依進度遞增排序，最危險的在前）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyGoalReport {
    pub week: WeekWindow,
    pub days_remaining: u32,
    pub goals: Vec<WeeklyGoal>,
}

impl WeeklyGoalReport {
    pub fn goal(&self, product: &ProductKey) -> Option<&WeeklyGoal> {
        self.goals.iter().find(|g| &g.product == product)
    }

    pub fn count_with_status(&self, status: GoalStatus) -> usize {
        self.goals.iter().filter(|g| g.status == status).count()
    }
}

/// 進度百分比，計劃為 0 時為 0
pub fn progress(planned: Decimal, actual: Decimal) -> Decimal {
    percentage(actual, planned)
}

/// 週目標追蹤器
pub struct WeeklyGoalTracker<'a> {
    config: &'a EngineConfig,
}

impl<'a> WeeklyGoalTracker<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// 判定狀態
    pub fn status(&self, progress: Decimal, days_remaining: u32) -> GoalStatus {
        if progress >= self.config.completed_threshold {
            GoalStatus::Completed
        } else if days_remaining <= self.config.late_window_days
            && progress < self.config.late_progress_threshold
        {
            GoalStatus::Late
        } else {
            GoalStatus::InProgress
        }
    }

    /// 追蹤 `today` 所在週的目標
    ///
    /// 只列出本週有計劃的產品，週外的計劃與紀錄會被忽略。
    pub fn track(
        &self,
        plan: &[WeeklyPlanEntry],
        records: &[ProductionRecord],
        today: NaiveDate,
    ) -> WeeklyGoalReport {
        let week = WeekWindow::containing(today);
        let days_remaining = week.days_remaining(today);

        let mut planned: BTreeMap<ProductKey, Decimal> = BTreeMap::new();
        for entry in plan.iter().filter(|e| week.contains(e.target_day)) {
            let total = planned.entry(entry.product.clone()).or_insert(Decimal::ZERO);
            *total = total.saturating_add(entry.planned_quantity);
        }

        let mut actual: BTreeMap<&ProductKey, Decimal> = BTreeMap::new();
        for record in records.iter().filter(|r| week.contains(r.date)) {
            let total = actual.entry(&record.product).or_insert(Decimal::ZERO);
            *total = total.saturating_add(record.quantity);
        }

        let mut goals: Vec<WeeklyGoal> = planned
            .into_iter()
            .map(|(product, planned)| {
                let actual = actual.get(&product).copied().unwrap_or(Decimal::ZERO);
                let progress = progress(planned, actual);
                WeeklyGoal {
                    status: self.status(progress, days_remaining),
                    product,
                    planned,
                    actual,
                    progress,
                }
            })
            .collect();

        goals.sort_by(|a, b| a.progress.cmp(&b.progress).then_with(|| a.product.cmp(&b.product)));

        tracing::debug!(
            "週目標 {} ~ {}：{} 項產品，剩餘 {} 天",
            week.monday,
            week.sunday,
            goals.len(),
            days_remaining
        );

        WeeklyGoalReport {
            week,
            days_remaining,
            goals,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shiftboard_core::LineKey;

    fn sku(id: &str) -> ProductKey {
        ProductKey::Known(id.to_string())
    }

    fn day(d: u32) -> NaiveDate {
        // 2025-11-03 是週一
        NaiveDate::from_ymd_opt(2025, 11, d).unwrap()
    }

    fn produced(product: ProductKey, date: NaiveDate, quantity: i64) -> ProductionRecord {
        ProductionRecord::new(
            date,
            "A",
            LineKey::Known("L1".to_string()),
            product,
            Decimal::from(quantity),
        )
    }

    #[test]
    fn test_completed_goal() {
        let config = EngineConfig::default();
        let tracker = WeeklyGoalTracker::new(&config);
        let plan = vec![WeeklyPlanEntry::new(sku("SKU-001"), day(4), Decimal::from(500))];
        let records = vec![
            produced(sku("SKU-001"), day(3), 300),
            produced(sku("SKU-001"), day(5), 220),
        ];

        let report = tracker.track(&plan, &records, day(5));
        let goal = report.goal(&sku("SKU-001")).unwrap();

        assert_eq!(goal.actual, Decimal::from(520));
        assert_eq!(goal.progress, Decimal::from(104));
        assert_eq!(goal.status, GoalStatus::Completed);
    }

    #[test]
    fn test_tiny_plan_saturates_progress() {
        let config = EngineConfig::default();
        let tracker = WeeklyGoalTracker::new(&config);
        let plan = vec![WeeklyPlanEntry::new(sku("SKU-001"), day(4), Decimal::new(1, 27))];
        let records = vec![produced(sku("SKU-001"), day(3), 100_000_000)];

        let goal = tracker.track(&plan, &records, day(5)).goals.remove(0);

        assert_eq!(goal.progress, Decimal::MAX);
        assert_eq!(goal.status, GoalStatus::Completed);
    }

    #[test]
    fn test_late_only_near_week_end() {
        let config = EngineConfig::default();
        let tracker = WeeklyGoalTracker::new(&config);
        let plan = vec![WeeklyPlanEntry::new(sku("SKU-001"), day(3), Decimal::from(1000))];
        let records = vec![produced(sku("SKU-001"), day(3), 300)];

        // 週三剩 4 天，仍在進行中
        assert_eq!(
            tracker.track(&plan, &records, day(5)).goals[0].status,
            GoalStatus::InProgress
        );
        // 週五剩 2 天且進度 30%，落後
        assert_eq!(tracker.track(&plan, &records, day(7)).goals[0].status, GoalStatus::Late);
    }

    #[test]
    fn test_status_thresholds() {
        let config = EngineConfig::default();
        let tracker = WeeklyGoalTracker::new(&config);

        assert_eq!(tracker.status(Decimal::from(100), 6), GoalStatus::Completed);
        assert_eq!(tracker.status(Decimal::from(50), 0), GoalStatus::InProgress);
        assert_eq!(tracker.status(Decimal::new(499, 1), 2), GoalStatus::Late);
        assert_eq!(tracker.status(Decimal::new(499, 1), 3), GoalStatus::InProgress);
    }

    #[test]
    fn test_excludes_other_weeks_and_sorts_by_progress() {
        let config = EngineConfig::default();
        let tracker = WeeklyGoalTracker::new(&config);
        let plan = vec![
            WeeklyPlanEntry::new(sku("SKU-001"), day(3), Decimal::from(100)),
            WeeklyPlanEntry::new(sku("SKU-002"), day(4), Decimal::from(100)),
            WeeklyPlanEntry::new(sku("SKU-002"), day(10), Decimal::from(900)),
            WeeklyPlanEntry::new(sku("SKU-003"), day(6), Decimal::ZERO),
        ];
        let records = vec![
            produced(sku("SKU-001"), day(3), 80),
            produced(sku("SKU-002"), day(4), 20),
            produced(sku("SKU-002"), day(2), 500),
            produced(sku("SKU-004"), day(4), 999),
        ];

        let report = tracker.track(&plan, &records, day(4));

        assert_eq!(report.goals.len(), 3);
        assert_eq!(report.goals[0].product, sku("SKU-003"));
        assert_eq!(report.goals[0].progress, Decimal::ZERO);
        assert_eq!(report.goals[1].product, sku("SKU-002"));
        assert_eq!(report.goals[1].planned, Decimal::from(100));
        assert_eq!(report.goals[1].actual, Decimal::from(20));
        assert_eq!(report.goals[2].product, sku("SKU-001"));
        assert!(report.goal(&sku("SKU-004")).is_none());
    }

    #[test]
    fn test_empty_plan() {
        let config = EngineConfig::default();
        let report = WeeklyGoalTracker::new(&config).track(&[], &[], day(9));

        assert!(report.goals.is_empty());
        assert_eq!(report.days_remaining, 0);
        assert_eq!(report.count_with_status(GoalStatus::Late), 0);
    }
}
