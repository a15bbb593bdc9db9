//! # Shiftboard Core
//!
//! 核心資料模型與類型定義

pub mod calendar;
pub mod config;
pub mod filter;
pub mod line;
pub mod order;
pub mod plan;
pub mod product;
pub mod production;
pub mod raw;

// Re-export 主要類型
pub use calendar::{DateRange, WeekWindow};
pub use config::EngineConfig;
pub use filter::RecordFilter;
pub use line::{Line, LineKey};
pub use order::{Order, OrderLine, OrderStatus};
pub use plan::WeeklyPlanEntry;
pub use product::{Product, ProductKey};
pub use production::{ProductionRecord, StopEvent, StopType};
pub use raw::{
    RawDuration, RawOrder, RawOrderLine, RawProductionRecord, RawStopEvent, RawWeeklyPlanEntry,
};

/// Shiftboard 錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum ShiftboardError {
    #[error("資料來源錯誤: {0}")]
    DataStore(String),

    #[error("無效的配置: {0}")]
    InvalidConfig(String),

    #[error("無效的日期範圍: {0}")]
    InvalidDateRange(String),

    #[error("JSON 解析錯誤: {0}")]
    Json(#[from] serde_json::Error),

    #[error("其他錯誤: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ShiftboardError>;
