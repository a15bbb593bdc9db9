//! 庫存對帳
//!
//! 兩種結存定義並存，不互相取代：
//! - 即時結存（`LiveBalance`）：全部生產歷史減去已出貨訂單，
//!   庫存低於待出貨需求即為告急。
//! - 快照結存（`SnapshotBalance`）：以標準產能的固定比例作為期初庫存，
//!   預測值為負即為告急。

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shiftboard_core::{Order, Product, ProductKey, ProductionRecord};
use std::collections::{BTreeMap, BTreeSet};

use crate::normalize::ProductCatalog;

/// 包裝換算（僅計整包、整棧板）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackagingBreakdown {
    pub packs: Decimal,
    pub pallets: Decimal,
}

impl PackagingBreakdown {
    /// 依產品包裝規格換算，規格不完整時回傳 None
    pub fn for_product(product: &Product, quantity: Decimal) -> Option<Self> {
        let units_per_pack = Decimal::from(product.units_per_pack.filter(|u| *u > 0)?);
        let packs_per_pallet = Decimal::from(product.packs_per_pallet.filter(|p| *p > 0)?);
        let quantity = quantity.max(Decimal::ZERO);

        let packs = (quantity / units_per_pack).floor();
        Some(Self {
            packs,
            pallets: (packs / packs_per_pallet).floor(),
        })
    }
}

/// 即時結存
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveBalance {
    pub product: ProductKey,
    pub total_produced: Decimal,
    pub total_shipped: Decimal,
    /// 庫存 = 總產量 - 已出貨
    pub stock: Decimal,
    pub pending_demand: Decimal,
    /// 預測 = 庫存 - 待出貨需求
    pub forecast: Decimal,
    /// 庫存低於待出貨需求
    pub critical: bool,
    pub packaging: Option<PackagingBreakdown>,
}

/// 快照結存
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotBalance {
    pub product: ProductKey,
    /// 期初庫存 = 標準產能 × 比例
    pub seed_stock: Decimal,
    pub pending_demand: Decimal,
    /// 預測 = 期初庫存 - 待出貨需求
    pub forecast: Decimal,
    /// 預測為負
    pub critical: bool,
}

/// 庫存對帳結果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryReport {
    pub live: BTreeMap<ProductKey, LiveBalance>,
    pub snapshot: BTreeMap<ProductKey, SnapshotBalance>,
}

impl InventoryReport {
    pub fn live_balance(&self, product: &ProductKey) -> Option<&LiveBalance> {
        self.live.get(product)
    }

    pub fn snapshot_balance(&self, product: &ProductKey) -> Option<&SnapshotBalance> {
        self.snapshot.get(product)
    }

    /// 即時庫存（無紀錄時為 0）
    pub fn stock(&self, product: &ProductKey) -> Decimal {
        self.live.get(product).map(|b| b.stock).unwrap_or(Decimal::ZERO)
    }

    pub fn pending_demand(&self, product: &ProductKey) -> Decimal {
        self.live.get(product).map(|b| b.pending_demand).unwrap_or(Decimal::ZERO)
    }

    pub fn forecast(&self, product: &ProductKey) -> Decimal {
        self.live.get(product).map(|b| b.forecast).unwrap_or(Decimal::ZERO)
    }

    /// 即時結存告急的產品
    pub fn critical_live(&self) -> Vec<&LiveBalance> {
        self.live.values().filter(|b| b.critical).collect()
    }

    /// 快照結存告急的產品
    pub fn critical_snapshot(&self) -> Vec<&SnapshotBalance> {
        self.snapshot.values().filter(|b| b.critical).collect()
    }
}

/// 庫存對帳器
pub struct InventoryReconciler<'a> {
    catalog: &'a ProductCatalog,
    seed_fraction: Decimal,
}

#[derive(Default)]
struct Totals {
    produced: Decimal,
    shipped: Decimal,
    pending: Decimal,
}

impl<'a> InventoryReconciler<'a> {
    /// 期初比例限制於 0-1
    pub fn new(catalog: &'a ProductCatalog, seed_fraction: Decimal) -> Self {
        Self {
            catalog,
            seed_fraction: seed_fraction.clamp(Decimal::ZERO, Decimal::ONE),
        }
    }

    /// 以完整歷史重新計算所有產品結存
    pub fn reconcile(&self, records: &[ProductionRecord], orders: &[Order]) -> InventoryReport {
        tracing::debug!(
            "庫存對帳：生產紀錄 {} 筆，訂單 {} 筆，產品 {} 項",
            records.len(),
            orders.len(),
            self.catalog.len()
        );

        let mut totals: BTreeMap<ProductKey, Totals> = self
            .catalog
            .iter()
            .map(|p| (ProductKey::Known(p.id.clone()), Totals::default()))
            .collect();

        for record in records {
            totals.entry(record.product.clone()).or_default().produced += record.quantity;
        }

        let mut demanded: BTreeSet<ProductKey> = BTreeSet::new();
        for order in orders {
            for line in &order.lines {
                let entry = totals.entry(line.product.clone()).or_default();
                if order.status.is_shipped() {
                    entry.shipped += line.quantity;
                } else if order.status.is_open() {
                    entry.pending += line.quantity;
                    demanded.insert(line.product.clone());
                }
            }
        }

        let live: BTreeMap<ProductKey, LiveBalance> = totals
            .iter()
            .map(|(key, t)| (key.clone(), self.live_balance(key, t)))
            .collect();

        let snapshot: BTreeMap<ProductKey, SnapshotBalance> = totals
            .iter()
            .filter(|(key, _)| !key.is_unidentified() || demanded.contains(*key))
            .map(|(key, t)| (key.clone(), self.snapshot_balance(key, t.pending)))
            .collect();

        let unidentified = live.keys().filter(|k| k.is_unidentified()).count();
        if unidentified > 0 {
            tracing::warn!("庫存對帳包含 {} 個未識別 SKU", unidentified);
        }

        InventoryReport { live, snapshot }
    }

    fn live_balance(&self, key: &ProductKey, totals: &Totals) -> LiveBalance {
        let stock = totals.produced - totals.shipped;
        LiveBalance {
            product: key.clone(),
            total_produced: totals.produced,
            total_shipped: totals.shipped,
            stock,
            pending_demand: totals.pending,
            forecast: stock - totals.pending,
            critical: stock < totals.pending,
            packaging: self
                .catalog
                .product(key)
                .and_then(|p| PackagingBreakdown::for_product(p, stock)),
        }
    }

    fn snapshot_balance(&self, key: &ProductKey, pending_demand: Decimal) -> SnapshotBalance {
        let seed_stock = self
            .catalog
            .product(key)
            .map(|p| p.nominal_capacity_per_8h.max(Decimal::ZERO) * self.seed_fraction)
            .unwrap_or(Decimal::ZERO);
        let forecast = seed_stock - pending_demand;
        SnapshotBalance {
            product: key.clone(),
            seed_stock,
            pending_demand,
            forecast,
            critical: forecast < Decimal::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use shiftboard_core::{LineKey, OrderStatus};

    fn sku(id: &str) -> ProductKey {
        ProductKey::Known(id.to_string())
    }

    fn catalog() -> ProductCatalog {
        ProductCatalog::new(vec![
            Product::new("SKU-001", "Water 500ml", Decimal::from(7200)).with_packaging(12, 80),
            Product::new("SKU-002", "Juice 1L", Decimal::from(4000)),
        ])
    }

    fn produced(product: ProductKey, quantity: i64) -> ProductionRecord {
        ProductionRecord::new(
            NaiveDate::from_ymd_opt(2025, 11, 3).unwrap(),
            "A",
            LineKey::Known("L1".to_string()),
            product,
            Decimal::from(quantity),
        )
    }

    fn order(status: OrderStatus, product: ProductKey, quantity: i64) -> Order {
        Order::new("ACME", NaiveDate::from_ymd_opt(2025, 11, 10).unwrap())
            .with_status(status)
            .with_line(product, Decimal::from(quantity))
    }

    #[test]
    fn test_live_balance() {
        let catalog = catalog();
        let reconciler = InventoryReconciler::new(&catalog, Decimal::new(15, 2));
        let records = vec![produced(sku("SKU-001"), 600), produced(sku("SKU-001"), 400)];
        let orders = vec![
            order(OrderStatus::Finalized, sku("SKU-001"), 200),
            order(OrderStatus::Pending, sku("SKU-001"), 300),
            order(OrderStatus::Cancelled, sku("SKU-001"), 999),
        ];

        let report = reconciler.reconcile(&records, &orders);
        let balance = report.live_balance(&sku("SKU-001")).unwrap();

        assert_eq!(balance.total_produced, Decimal::from(1000));
        assert_eq!(balance.total_shipped, Decimal::from(200));
        assert_eq!(balance.stock, Decimal::from(800));
        assert_eq!(balance.pending_demand, Decimal::from(300));
        assert_eq!(balance.forecast, Decimal::from(500));
        assert!(!balance.critical);
    }

    #[test]
    fn test_delivered_counts_as_shipped_and_scheduled_as_pending() {
        let catalog = catalog();
        let reconciler = InventoryReconciler::new(&catalog, Decimal::new(15, 2));
        let records = vec![produced(sku("SKU-002"), 100)];
        let orders = vec![
            order(OrderStatus::Delivered, sku("SKU-002"), 50),
            order(OrderStatus::Scheduled, sku("SKU-002"), 80),
        ];

        let report = reconciler.reconcile(&records, &orders);

        assert_eq!(report.stock(&sku("SKU-002")), Decimal::from(50));
        assert_eq!(report.pending_demand(&sku("SKU-002")), Decimal::from(80));
        assert_eq!(report.forecast(&sku("SKU-002")), Decimal::from(-30));
        assert_eq!(report.critical_live().len(), 1);
    }

    #[test]
    fn test_snapshot_balance_seeded_from_capacity() {
        let catalog = catalog();
        let reconciler = InventoryReconciler::new(&catalog, Decimal::new(15, 2));
        let orders = vec![order(OrderStatus::Pending, sku("SKU-002"), 700)];

        let report = reconciler.reconcile(&[], &orders);

        let water = report.snapshot_balance(&sku("SKU-001")).unwrap();
        assert_eq!(water.seed_stock, Decimal::from(1080));
        assert!(!water.critical);

        let juice = report.snapshot_balance(&sku("SKU-002")).unwrap();
        assert_eq!(juice.seed_stock, Decimal::from(600));
        assert_eq!(juice.forecast, Decimal::from(-100));
        assert!(juice.critical);

        // 即時結存同時告急（庫存 0 < 需求 700）
        assert!(report.live_balance(&sku("SKU-002")).unwrap().critical);
    }

    #[test]
    fn test_seed_fraction_clamped() {
        let catalog = catalog();
        let orders = vec![order(OrderStatus::Pending, sku("SKU-001"), 100)];

        let negative =
            InventoryReconciler::new(&catalog, Decimal::new(-5, 1)).reconcile(&[], &orders);
        let water = negative.snapshot_balance(&sku("SKU-001")).unwrap();
        assert_eq!(water.seed_stock, Decimal::ZERO);
        assert_eq!(water.forecast, Decimal::from(-100));

        let oversized =
            InventoryReconciler::new(&catalog, Decimal::from(3)).reconcile(&[], &orders);
        assert_eq!(
            oversized.snapshot_balance(&sku("SKU-001")).unwrap().seed_stock,
            Decimal::from(7200)
        );
    }

    #[test]
    fn test_definitions_can_disagree() {
        let catalog = catalog();
        let reconciler = InventoryReconciler::new(&catalog, Decimal::new(15, 2));
        // 期初 1080 可滿足 500，但實際庫存 0
        let orders = vec![order(OrderStatus::Pending, sku("SKU-001"), 500)];

        let report = reconciler.reconcile(&[], &orders);

        assert!(report.live_balance(&sku("SKU-001")).unwrap().critical);
        assert!(!report.snapshot_balance(&sku("SKU-001")).unwrap().critical);
    }

    #[test]
    fn test_unidentified_bucket_participates() {
        let catalog = catalog();
        let reconciler = InventoryReconciler::new(&catalog, Decimal::new(15, 2));
        let legacy = ProductKey::Unidentified("Old Lemonade".to_string());
        let records = vec![produced(legacy.clone(), 40)];
        let orders = vec![order(OrderStatus::Pending, legacy.clone(), 10)];

        let report = reconciler.reconcile(&records, &orders);

        assert_eq!(report.stock(&legacy), Decimal::from(40));
        let snapshot = report.snapshot_balance(&legacy).unwrap();
        assert_eq!(snapshot.seed_stock, Decimal::ZERO);
        assert!(snapshot.critical);
    }

    #[test]
    fn test_empty_history() {
        let catalog = catalog();
        let report = InventoryReconciler::new(&catalog, Decimal::new(15, 2)).reconcile(&[], &[]);

        assert_eq!(report.live.len(), 2);
        assert_eq!(report.stock(&sku("SKU-001")), Decimal::ZERO);
        assert_eq!(report.stock(&sku("MISSING")), Decimal::ZERO);
        assert!(report.critical_live().is_empty());
    }

    #[test]
    fn test_packaging_breakdown() {
        let catalog = catalog();
        let reconciler = InventoryReconciler::new(&catalog, Decimal::new(15, 2));
        let records = vec![produced(sku("SKU-001"), 2000)];

        let report = reconciler.reconcile(&records, &[]);
        let packaging = report.live_balance(&sku("SKU-001")).unwrap().packaging.unwrap();

        // 2000 / 12 = 166 包，166 / 80 = 2 棧板
        assert_eq!(packaging.packs, Decimal::from(166));
        assert_eq!(packaging.pallets, Decimal::from(2));
        assert!(report.live_balance(&sku("SKU-002")).unwrap().packaging.is_none());
    }
}
