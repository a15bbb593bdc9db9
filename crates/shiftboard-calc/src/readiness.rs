//! 訂單備貨檢查：訂單每一筆明細是否都能由即時庫存滿足

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shiftboard_core::{Order, OrderStatus, ProductKey};
use uuid::Uuid;

use crate::inventory::InventoryReport;

/// 明細缺口
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineShortage {
    pub product: ProductKey,
    pub required: Decimal,
    pub available: Decimal,
    pub shortfall: Decimal,
}

/// 訂單備貨結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessReport {
    pub order_id: Uuid,
    pub status: OrderStatus,
    pub ready: bool,
    pub shortages: Vec<LineShortage>,
}

/// 以任意庫存查詢判斷訂單是否可出貨
///
/// 逐筆明細比對，不合併同產品的多筆明細。庫存增加不會讓可出貨變為不可出貨。
pub fn is_ready_with<F>(order: &Order, stock: F) -> bool
where
    F: Fn(&ProductKey) -> Decimal,
{
    order.lines.iter().all(|line| stock(&line.product) >= line.quantity)
}

/// 備貨檢查器（使用即時結存）
pub struct ReadinessMatcher<'a> {
    inventory: &'a InventoryReport,
}

impl<'a> ReadinessMatcher<'a> {
    pub fn new(inventory: &'a InventoryReport) -> Self {
        Self { inventory }
    }

    pub fn is_ready(&self, order: &Order) -> bool {
        is_ready_with(order, |product| self.inventory.stock(product))
    }

    /// 檢查訂單並列出缺口
    pub fn evaluate(&self, order: &Order) -> ReadinessReport {
        let shortages: Vec<LineShortage> = order
            .lines
            .iter()
            .filter_map(|line| {
                let available = self.inventory.stock(&line.product);
                (available < line.quantity).then(|| LineShortage {
                    product: line.product.clone(),
                    required: line.quantity,
                    available,
                    shortfall: line.quantity - available.max(Decimal::ZERO),
                })
            })
            .collect();

        ReadinessReport {
            order_id: order.id,
            status: order.status,
            ready: shortages.is_empty(),
            shortages,
        }
    }

    /// 檢查所有未出貨訂單（依交期排序）
    pub fn backlog<'o, I>(&self, orders: I) -> Vec<ReadinessReport>
    where
        I: IntoIterator<Item = &'o Order>,
    {
        let mut open: Vec<&Order> = orders.into_iter().filter(|o| o.status.is_open()).collect();
        open.sort_by(|a, b| a.delivery_date.cmp(&b.delivery_date).then_with(|| a.id.cmp(&b.id)));
        open.into_iter().map(|o| self.evaluate(o)).collect()
    }
}
