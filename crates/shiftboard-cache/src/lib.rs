//! # Shiftboard Cache
//!
//! 資料來源、版本化快照與看板查詢服務

pub mod data_store;
pub mod memo;
pub mod service;
pub mod snapshot_store;

// Re-export 主要類型
pub use data_store::{fetch_all, DataStore, InMemoryDataStore};
pub use memo::MetricsMemo;
pub use service::DashboardService;
pub use snapshot_store::{RefreshOutcome, SnapshotStore, VersionedSnapshot};
