//! 原始輸入紀錄（資料來源的鬆散型別）
//!
//! 資料來源中的欄位型別並不一致：停機時長可能是數字或夾帶數字的文字，
//! 產品可能以ID或舊的顯示名稱引用。這裡的型別只負責接收，
//! 轉換為強型別紀錄由正規化器一次完成。

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::order::OrderStatus;

/// 原始停機時長
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawDuration {
    /// 數字（分鐘）
    Number(f64),
    /// 文字，例如 "30min"、"45 分"
    Text(String),
    /// 其他任何 JSON 值
    Other(serde_json::Value),
}

impl From<u32> for RawDuration {
    fn from(minutes: u32) -> Self {
        RawDuration::Number(f64::from(minutes))
    }
}

impl From<&str> for RawDuration {
    fn from(text: &str) -> Self {
        RawDuration::Text(text.to_string())
    }
}

/// 原始停機事件
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawStopEvent {
    #[serde(rename = "type", default)]
    pub stop_type: Option<String>,

    #[serde(default)]
    pub equipment: Option<String>,

    #[serde(default)]
    pub reason: Option<String>,

    #[serde(default)]
    pub duration: Option<RawDuration>,

    /// 開始時間（"HH:MM" 或 "HH:MM:SS"）
    #[serde(default)]
    pub start: Option<String>,

    #[serde(default)]
    pub end: Option<String>,
}

impl RawStopEvent {
    /// 創建只有時長的停機事件
    pub fn with_duration(duration: impl Into<RawDuration>) -> Self {
        Self {
            duration: Some(duration.into()),
            ..Self::default()
        }
    }

    /// 建構器模式：設置類型
    pub fn typed(mut self, stop_type: &str) -> Self {
        self.stop_type = Some(stop_type.to_string());
        self
    }

    /// 建構器模式：設置設備與原因
    pub fn at(mut self, equipment: &str, reason: &str) -> Self {
        self.equipment = Some(equipment.to_string());
        self.reason = Some(reason.to_string());
        self
    }
}

/// 原始生產紀錄
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawProductionRecord {
    #[serde(default)]
    pub id: Option<Uuid>,

    pub date: NaiveDate,

    #[serde(default)]
    pub shift: String,

    /// 產線引用（ID 或名稱）
    #[serde(default)]
    pub line: String,

    /// 產品引用（ID 或舊的顯示名稱）
    #[serde(default)]
    pub product: String,

    #[serde(default)]
    pub quantity: Option<Decimal>,

    #[serde(default)]
    pub hours_worked: Option<Decimal>,

    #[serde(default)]
    pub nominal_capacity: Option<Decimal>,

    #[serde(default)]
    pub stops: Vec<RawStopEvent>,

    #[serde(default)]
    pub notes: Option<String>,
}

impl RawProductionRecord {
    /// 創建新的原始紀錄
    pub fn new(date: NaiveDate, shift: &str, line: &str, product: &str, quantity: Decimal) -> Self {
        Self {
            id: Some(Uuid::new_v4()),
            date,
            shift: shift.to_string(),
            line: line.to_string(),
            product: product.to_string(),
            quantity: Some(quantity),
            hours_worked: None,
            nominal_capacity: None,
            stops: Vec::new(),
            notes: None,
        }
    }

    /// 建構器模式：設置工作時數
    pub fn with_hours_worked(mut self, hours: Decimal) -> Self {
        self.hours_worked = Some(hours);
        self
    }

    /// 建構器模式：設置停機事件
    pub fn with_stops(mut self, stops: Vec<RawStopEvent>) -> Self {
        self.stops = stops;
        self
    }
}

/// 原始訂單明細
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawOrderLine {
    pub product: String,
    pub quantity: Decimal,
}

/// 原始訂單
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawOrder {
    pub id: Uuid,

    #[serde(default)]
    pub customer: String,

    pub delivery_date: NaiveDate,

    pub status: OrderStatus,

    #[serde(default)]
    pub lines: Vec<RawOrderLine>,
}

impl RawOrder {
    pub fn new(customer: &str, delivery_date: NaiveDate, status: OrderStatus) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer: customer.to_string(),
            delivery_date,
            status,
            lines: Vec::new(),
        }
    }

    /// 建構器模式：添加明細
    pub fn with_line(mut self, product: &str, quantity: Decimal) -> Self {
        self.lines.push(RawOrderLine {
            product: product.to_string(),
            quantity,
        });
        self
    }
}

/// 原始週計劃明細
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawWeeklyPlanEntry {
    pub product: String,
    pub target_day: NaiveDate,
    pub planned_quantity: Decimal,
}

impl RawWeeklyPlanEntry {
    pub fn new(product: &str, target_day: NaiveDate, planned_quantity: Decimal) -> Self {
        Self {
            product: product.to_string(),
            target_day,
            planned_quantity,
        }
    }
}
