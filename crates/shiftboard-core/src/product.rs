//! 產品（SKU）模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 產品主檔
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// 產品ID
    pub id: String,

    /// 顯示名稱（舊資料可能以名稱代替ID引用）
    pub name: String,

    /// 標準產能（每 8 小時班）
    pub nominal_capacity_per_8h: Decimal,

    /// 每包單位數
    pub units_per_pack: Option<u32>,

    /// 每棧板包數
    pub packs_per_pallet: Option<u32>,
}

impl Product {
    /// 創建新的產品
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        nominal_capacity_per_8h: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            nominal_capacity_per_8h,
            units_per_pack: None,
            packs_per_pallet: None,
        }
    }

    /// 建構器模式：設置包裝規格
    pub fn with_packaging(mut self, units_per_pack: u32, packs_per_pallet: u32) -> Self {
        self.units_per_pack = Some(units_per_pack);
        self.packs_per_pallet = Some(packs_per_pallet);
        self
    }

    /// 是否具有可用的標準產能
    pub fn has_capacity(&self) -> bool {
        self.nominal_capacity_per_8h > Decimal::ZERO
    }

    /// 每棧板單位數
    pub fn units_per_pallet(&self) -> Option<u32> {
        match (self.units_per_pack, self.packs_per_pallet) {
            (Some(units), Some(packs)) if units > 0 && packs > 0 => units.checked_mul(packs),
            _ => None,
        }
    }
}

/// 解析後的產品鍵
///
/// 無法辨識的引用保留原始值作為分組鍵，確保彙總永遠有穩定的桶。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProductKey {
    /// 已對應到產品主檔
    Known(String),
    /// 未識別 SKU（保留原始引用）
    Unidentified(String),
}

impl ProductKey {
    /// 產品ID（未識別時為 None）
    pub fn product_id(&self) -> Option<&str> {
        match self {
            ProductKey::Known(id) => Some(id),
            ProductKey::Unidentified(_) => None,
        }
    }

    /// 顯示用標籤
    pub fn label(&self) -> &str {
        match self {
            ProductKey::Known(id) | ProductKey::Unidentified(id) => id,
        }
    }

    pub fn is_unidentified(&self) -> bool {
        matches!(self, ProductKey::Unidentified(_))
    }
}

impl fmt::Display for ProductKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductKey::Known(id) => write!(f, "{}", id),
            ProductKey::Unidentified(raw) => write!(f, "未識別SKU({})", raw),
        }
    }
}
