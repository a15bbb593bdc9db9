//! # Shiftboard
//!
//! 生產看板對帳引擎：把產品、產線、訂單、生產紀錄與週計劃五個集合
//! 計算成庫存、停機、效率、週目標與訂單備貨五種唯讀指標。
//!
//! - [`model`]：資料模型、配置與錯誤類型
//! - [`calc`]：正規化與各項指標計算
//! - [`cache`]：資料來源、版本化快照與查詢服務

pub use shiftboard_cache as cache;
pub use shiftboard_calc as calc;
pub use shiftboard_core as model;

pub use shiftboard_cache::{
    DashboardService, DataStore, InMemoryDataStore, RefreshOutcome, SnapshotStore,
};
pub use shiftboard_calc::{MetricsCalculator, RawSnapshot, Snapshot};
pub use shiftboard_core::{EngineConfig, Result, ShiftboardError};
