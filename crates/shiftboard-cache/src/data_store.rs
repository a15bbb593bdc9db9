//! 資料來源介面
//!
//! 五個集合各自非同步取得，回傳未正規化的原始資料。

use async_trait::async_trait;
use shiftboard_calc::RawSnapshot;
use shiftboard_core::{
    Line, Product, RawOrder, RawProductionRecord, RawWeeklyPlanEntry, Result, ShiftboardError,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

/// 資料來源
#[async_trait]
pub trait DataStore: Send + Sync {
    /// 產品主檔
    async fn fetch_products(&self) -> Result<Vec<Product>>;

    /// 產線主檔
    async fn fetch_lines(&self) -> Result<Vec<Line>>;

    /// 客戶訂單（含所有狀態）
    async fn fetch_orders(&self) -> Result<Vec<RawOrder>>;

    /// 完整生產紀錄歷史
    async fn fetch_production_records(&self) -> Result<Vec<RawProductionRecord>>;

    /// 週計劃
    async fn fetch_weekly_plan(&self) -> Result<Vec<RawWeeklyPlanEntry>>;
}

/// 同時取得五個集合，任一失敗即整體失敗
pub async fn fetch_all(store: &dyn DataStore) -> Result<RawSnapshot> {
    let (products, lines, orders, records, weekly_plan) = tokio::try_join!(
        store.fetch_products(),
        store.fetch_lines(),
        store.fetch_orders(),
        store.fetch_production_records(),
        store.fetch_weekly_plan(),
    )?;

    Ok(RawSnapshot {
        products,
        lines,
        orders,
        records,
        weekly_plan,
    })
}

/// 記憶體資料來源（測試與展示用）
#[derive(Debug, Default)]
pub struct InMemoryDataStore {
    data: RwLock<RawSnapshot>,
    failing: AtomicBool,
}

impl InMemoryDataStore {
    pub fn new(data: RawSnapshot) -> Self {
        Self {
            data: RwLock::new(data),
            failing: AtomicBool::new(false),
        }
    }

    /// 從 JSON 載入（欄位名稱同 `RawSnapshot`）
    pub fn from_json_str(json: &str) -> Result<Self> {
        let data: RawSnapshot = serde_json::from_str(json)?;
        Ok(Self::new(data))
    }

    /// 替換全部資料
    pub fn replace(&self, data: RawSnapshot) {
        *self.data.write().unwrap_or_else(PoisonError::into_inner) = data;
    }

    /// 修改資料
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut RawSnapshot),
    {
        f(&mut self.data.write().unwrap_or_else(PoisonError::into_inner));
    }

    /// 模擬資料來源故障
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn read<T, F>(&self, collection: &str, f: F) -> Result<T>
    where
        F: FnOnce(&RawSnapshot) -> T,
    {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ShiftboardError::DataStore(format!("無法取得 {}", collection)));
        }
        Ok(f(&self.data.read().unwrap_or_else(PoisonError::into_inner)))
    }
}

#[async_trait]
impl DataStore for InMemoryDataStore {
    async fn fetch_products(&self) -> Result<Vec<Product>> {
        self.read("products", |d| d.products.clone())
    }

    async fn fetch_lines(&self) -> Result<Vec<Line>> {
        self.read("lines", |d| d.lines.clone())
    }

    async fn fetch_orders(&self) -> Result<Vec<RawOrder>> {
        self.read("orders", |d| d.orders.clone())
    }

    async fn fetch_production_records(&self) -> Result<Vec<RawProductionRecord>> {
        self.read("production_records", |d| d.records.clone())
    }

    async fn fetch_weekly_plan(&self) -> Result<Vec<RawWeeklyPlanEntry>> {
        self.read("weekly_plan", |d| d.weekly_plan.clone())
    }
}
