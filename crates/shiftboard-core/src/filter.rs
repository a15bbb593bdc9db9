//! 生產紀錄篩選條件

use serde::{Deserialize, Serialize};

use crate::calendar::DateRange;
use crate::production::ProductionRecord;

/// 紀錄篩選（日期 / 產線 / 班別）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilter {
    pub range: Option<DateRange>,
    pub line_id: Option<String>,
    pub shift: Option<String>,
}

impl RecordFilter {
    /// 不篩選
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_range(mut self, range: DateRange) -> Self {
        self.range = Some(range);
        self
    }

    pub fn with_line(mut self, line_id: impl Into<String>) -> Self {
        self.line_id = Some(line_id.into());
        self
    }

    pub fn with_shift(mut self, shift: impl Into<String>) -> Self {
        self.shift = Some(shift.into());
        self
    }

    /// 檢查紀錄是否符合條件
    pub fn matches(&self, record: &ProductionRecord) -> bool {
        if let Some(range) = &self.range {
            if !range.contains(record.date) {
                return false;
            }
        }
        if let Some(line_id) = &self.line_id {
            if !record.line.matches(line_id) {
                return false;
            }
        }
        if let Some(shift) = &self.shift {
            if !record.shift.eq_ignore_ascii_case(shift) {
                return false;
            }
        }
        true
    }
}
