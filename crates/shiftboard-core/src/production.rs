//! 生產紀錄模型（班別報工）

use chrono::{NaiveDate, NaiveTime, Timelike};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::line::LineKey;
use crate::product::ProductKey;

/// 停機類型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StopType {
    /// 計劃停機（保養、排定清潔）
    Scheduled,
    /// 非計劃停機（故障）
    Unplanned,
    /// 換線
    Changeover,
    /// 物流（缺料、等待搬運）
    Logistics,
    /// 行政（會議、訓練）
    Administrative,
}

impl StopType {
    pub const ALL: [StopType; 5] = [
        StopType::Scheduled,
        StopType::Unplanned,
        StopType::Changeover,
        StopType::Logistics,
        StopType::Administrative,
    ];

    /// 從原始標籤解析（不分大小寫）
    ///
    /// 缺少或無法辨識的類型視為非計劃停機。
    pub fn from_label(label: Option<&str>) -> Self {
        let Some(label) = label else {
            return StopType::Unplanned;
        };

        match label.trim().to_lowercase().as_str() {
            "scheduled" | "planned" => StopType::Scheduled,
            "changeover" | "setup" => StopType::Changeover,
            "logistics" => StopType::Logistics,
            "administrative" | "admin" => StopType::Administrative,
            _ => StopType::Unplanned,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StopType::Scheduled => "Scheduled",
            StopType::Unplanned => "Unplanned",
            StopType::Changeover => "Changeover",
            StopType::Logistics => "Logistics",
            StopType::Administrative => "Administrative",
        }
    }

    /// 是否計入瓶頸（可靠度）統計
    pub fn counts_as_bottleneck(&self) -> bool {
        *self != StopType::Scheduled
    }
}

/// 停機事件（歸屬於單一生產紀錄）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopEvent {
    /// 停機類型
    pub stop_type: StopType,

    /// 設備標籤
    pub equipment: String,

    /// 原因標籤
    pub reason: String,

    /// 停機時長（分鐘）
    pub minutes: u32,

    /// 開始時間
    pub start: Option<NaiveTime>,

    /// 結束時間
    pub end: Option<NaiveTime>,
}

impl StopEvent {
    /// 創建新的停機事件
    pub fn new(
        stop_type: StopType,
        equipment: impl Into<String>,
        reason: impl Into<String>,
        minutes: u32,
    ) -> Self {
        Self {
            stop_type,
            equipment: equipment.into(),
            reason: reason.into(),
            minutes,
            start: None,
            end: None,
        }
    }

    /// 建構器模式：設置起訖時間
    pub fn with_window(mut self, start: NaiveTime, end: NaiveTime) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    /// 起訖時間跨度（分鐘，跨午夜時回繞）
    ///
    /// 僅供顯示比對，統計一律使用 `minutes`。
    pub fn window_minutes(&self) -> Option<u32> {
        let (start, end) = (self.start?, self.end?);
        let start_min = start.num_seconds_from_midnight() / 60;
        let end_min = end.num_seconds_from_midnight() / 60;
        Some(if end_min >= start_min {
            end_min - start_min
        } else {
            24 * 60 - start_min + end_min
        })
    }
}

/// 生產紀錄（已正規化）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionRecord {
    /// 紀錄ID
    pub id: Uuid,

    /// 生產日期
    pub date: NaiveDate,

    /// 班別
    pub shift: String,

    /// 產線
    pub line: LineKey,

    /// 產品
    pub product: ProductKey,

    /// 產量
    pub quantity: Decimal,

    /// 工作時數
    pub hours_worked: Decimal,

    /// 報工當時的標準產能快照
    pub nominal_capacity: Option<Decimal>,

    /// 停機事件
    pub stops: Vec<StopEvent>,

    /// 備註
    pub notes: String,
}

impl ProductionRecord {
    /// 創建新的生產紀錄（預設 8 小時、無停機）
    pub fn new(
        date: NaiveDate,
        shift: impl Into<String>,
        line: LineKey,
        product: ProductKey,
        quantity: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            shift: shift.into(),
            line,
            product,
            quantity,
            hours_worked: Decimal::from(8),
            nominal_capacity: None,
            stops: Vec::new(),
            notes: String::new(),
        }
    }

    /// 建構器模式：設置工作時數
    pub fn with_hours_worked(mut self, hours: Decimal) -> Self {
        self.hours_worked = hours;
        self
    }

    /// 建構器模式：設置標準產能快照
    pub fn with_nominal_capacity(mut self, capacity: Decimal) -> Self {
        self.nominal_capacity = Some(capacity);
        self
    }

    /// 建構器模式：設置停機事件
    pub fn with_stops(mut self, stops: Vec<StopEvent>) -> Self {
        self.stops = stops;
        self
    }

    /// 添加停機事件
    pub fn add_stop(&mut self, stop: StopEvent) {
        self.stops.push(stop);
    }

    /// 工作分鐘數
    pub fn worked_minutes(&self) -> Decimal {
        self.hours_worked.saturating_mul(Decimal::from(60))
    }

    /// 全部停機分鐘數
    pub fn raw_stop_minutes(&self) -> u64 {
        self.stops.iter().map(|s| u64::from(s.minutes)).sum()
    }

    /// 瓶頸停機分鐘數（排除計劃停機）
    pub fn bottleneck_stop_minutes(&self) -> u64 {
        self.stops
            .iter()
            .filter(|s| s.stop_type.counts_as_bottleneck())
            .map(|s| u64::from(s.minutes))
            .sum()
    }
}
