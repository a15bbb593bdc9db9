//! 客戶訂單模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::product::ProductKey;

/// 訂單狀態
///
/// Pending → Scheduled → Finalized → Delivered，非終態可轉為 Cancelled。
/// 計算引擎只讀取狀態，不負責轉換。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// 待處理
    Pending,
    /// 已排程
    Scheduled,
    /// 已完成（已出貨扣庫）
    Finalized,
    /// 已交貨
    Delivered,
    /// 已取消
    Cancelled,
}

impl OrderStatus {
    /// 是否為終態
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// 是否已從庫存出貨
    pub fn is_shipped(&self) -> bool {
        matches!(self, OrderStatus::Finalized | OrderStatus::Delivered)
    }

    /// 是否計入待出貨需求
    pub fn is_open(&self) -> bool {
        !self.is_shipped() && *self != OrderStatus::Cancelled
    }

    /// 檢查狀態轉換是否合法
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        match (self, next) {
            (Pending, Scheduled) | (Scheduled, Finalized) | (Finalized, Delivered) => true,
            (from, Cancelled) => !from.is_terminal(),
            _ => false,
        }
    }
}

/// 訂單明細
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    /// 產品
    pub product: ProductKey,

    /// 數量
    pub quantity: Decimal,
}

impl OrderLine {
    pub fn new(product: ProductKey, quantity: Decimal) -> Self {
        Self { product, quantity }
    }
}

/// 客戶訂單
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// 訂單ID
    pub id: Uuid,

    /// 客戶
    pub customer: String,

    /// 交貨日期
    pub delivery_date: NaiveDate,

    /// 狀態
    pub status: OrderStatus,

    /// 明細
    pub lines: Vec<OrderLine>,
}

impl Order {
    /// 創建新的訂單（狀態為 Pending）
    pub fn new(customer: impl Into<String>, delivery_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer: customer.into(),
            delivery_date,
            status: OrderStatus::Pending,
            lines: Vec::new(),
        }
    }

    /// 建構器模式：設置狀態
    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = status;
        self
    }

    /// 建構器模式：添加明細
    pub fn with_line(mut self, product: ProductKey, quantity: Decimal) -> Self {
        self.lines.push(OrderLine::new(product, quantity));
        self
    }

    /// 指定產品的訂購總量
    pub fn quantity_for(&self, product: &ProductKey) -> Decimal {
        self.lines
            .iter()
            .filter(|l| &l.product == product)
            .map(|l| l.quantity)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(OrderStatus::Pending, false, true)]
    #[case(OrderStatus::Scheduled, false, true)]
    #[case(OrderStatus::Finalized, true, false)]
    #[case(OrderStatus::Delivered, true, false)]
    #[case(OrderStatus::Cancelled, false, false)]
    fn test_status_classification(
        #[case] status: OrderStatus,
        #[case] shipped: bool,
        #[case] open: bool,
    ) {
        assert_eq!(status.is_shipped(), shipped);
        assert_eq!(status.is_open(), open);
    }

    #[test]
    fn test_status_transitions() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Scheduled));
        assert!(OrderStatus::Scheduled.can_transition_to(OrderStatus::Finalized));
        assert!(OrderStatus::Finalized.can_transition_to(OrderStatus::Delivered));
        assert!(OrderStatus::Finalized.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Delivered));
    }

    #[test]
    fn test_order_builder() {
        let sku = ProductKey::Known("SKU-001".to_string());
        let order = Order::new("ACME", NaiveDate::from_ymd_opt(2025, 11, 10).unwrap())
            .with_status(OrderStatus::Scheduled)
            .with_line(sku.clone(), Decimal::from(100))
            .with_line(sku.clone(), Decimal::from(20));

        assert_eq!(order.status, OrderStatus::Scheduled);
        assert_eq!(order.lines.len(), 2);
        assert_eq!(order.quantity_for(&sku), Decimal::from(120));
    }
}
