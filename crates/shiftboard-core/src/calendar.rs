//! 日期區間與週視窗

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{Result, ShiftboardError};

/// 閉區間日期範圍
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// 創建日期範圍（起日不可晚於迄日）
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(ShiftboardError::InvalidDateRange(format!("{} > {}", start, end)));
        }
        Ok(Self { start, end })
    }

    /// 單日範圍
    pub fn single_day(date: NaiveDate) -> Self {
        Self { start: date, end: date }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// 範圍內天數
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// 週視窗（週一至週日）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeekWindow {
    pub monday: NaiveDate,
    pub sunday: NaiveDate,
}

impl WeekWindow {
    /// 取得包含指定日期的週
    pub fn containing(date: NaiveDate) -> Self {
        let offset = i64::from(date.weekday().num_days_from_monday());
        let monday = date - Duration::days(offset);
        Self {
            monday,
            sunday: monday + Duration::days(6),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.monday <= date && date <= self.sunday
    }

    /// 本週剩餘天數（不含當日，週日為 0）
    ///
    /// 日期早於本週時回傳 7，晚於本週時回傳 0。
    pub fn days_remaining(&self, today: NaiveDate) -> u32 {
        if today < self.monday {
            return 7;
        }
        if today > self.sunday {
            return 0;
        }
        (self.sunday - today).num_days() as u32
    }

    pub fn as_range(&self) -> DateRange {
        DateRange {
            start: self.monday,
            end: self.sunday,
        }
    }
}
