//! 資料快照：五個輸入集合正規化後的不可變副本

use serde::{Deserialize, Serialize};
use shiftboard_core::{
    EngineConfig, Line, LineKey, Order, Product, ProductionRecord, RawDuration, RawOrder,
    RawProductionRecord, RawWeeklyPlanEntry, RecordFilter, WeeklyPlanEntry,
};
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::normalize::{parse_duration, LineCatalog, Normalizer, ProductCatalog};
use crate::{DataQualityWarning, WarningSeverity};

/// 資料來源取得的原始集合
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSnapshot {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub lines: Vec<Line>,
    #[serde(default)]
    pub orders: Vec<RawOrder>,
    #[serde(default)]
    pub records: Vec<RawProductionRecord>,
    #[serde(default)]
    pub weekly_plan: Vec<RawWeeklyPlanEntry>,
}

/// 正規化後的快照
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    products: ProductCatalog,
    lines: LineCatalog,
    orders: Vec<Order>,
    records: Vec<ProductionRecord>,
    weekly_plan: Vec<WeeklyPlanEntry>,
    warnings: Vec<DataQualityWarning>,
}

impl Snapshot {
    /// 空快照（首次載入失敗時使用）
    pub fn empty() -> Self {
        Self::default()
    }

    /// 由已正規化的集合建立
    pub fn new(
        products: Vec<Product>,
        lines: Vec<Line>,
        orders: Vec<Order>,
        records: Vec<ProductionRecord>,
        weekly_plan: Vec<WeeklyPlanEntry>,
    ) -> Self {
        Self {
            products: ProductCatalog::new(products),
            lines: LineCatalog::new(lines),
            orders,
            records,
            weekly_plan,
            warnings: Vec::new(),
        }
    }

    /// 正規化原始集合（只在邊界做一次）
    pub fn from_raw(raw: RawSnapshot, config: &EngineConfig) -> Self {
        let products = ProductCatalog::new(raw.products);
        let lines = LineCatalog::new(raw.lines);

        let (records, orders, weekly_plan) = {
            let normalizer = Normalizer::new(&products, &lines, config);
            (
                raw.records.iter().map(|r| normalizer.production_record(r)).collect::<Vec<_>>(),
                raw.orders.iter().map(|o| normalizer.order(o)).collect::<Vec<_>>(),
                raw.weekly_plan.iter().map(|p| normalizer.plan_entry(p)).collect::<Vec<_>>(),
            )
        };

        let unparsable = raw
            .records
            .iter()
            .flat_map(|r| r.stops.iter())
            .filter(|s| is_unparsable(s.duration.as_ref()))
            .count();

        let mut snapshot = Self {
            products,
            lines,
            orders,
            records,
            weekly_plan,
            warnings: Vec::new(),
        };
        snapshot.warnings = snapshot.collect_warnings(unparsable);

        tracing::info!(
            "快照正規化完成：產品 {}，產線 {}，訂單 {}，生產紀錄 {}，週計劃 {}，警告 {}",
            snapshot.products.len(),
            snapshot.lines.len(),
            snapshot.orders.len(),
            snapshot.records.len(),
            snapshot.weekly_plan.len(),
            snapshot.warnings.len()
        );

        snapshot
    }

    fn collect_warnings(&self, unparsable_durations: usize) -> Vec<DataQualityWarning> {
        let mut products = BTreeSet::new();
        let mut lines = BTreeSet::new();

        for record in &self.records {
            if record.product.is_unidentified() {
                products.insert(record.product.label().to_string());
            }
            if let LineKey::Unidentified(raw) = &record.line {
                lines.insert(raw.clone());
            }
        }
        for line in self.orders.iter().flat_map(|o| o.lines.iter()) {
            if line.product.is_unidentified() {
                products.insert(line.product.label().to_string());
            }
        }
        for entry in &self.weekly_plan {
            if entry.product.is_unidentified() {
                products.insert(entry.product.label().to_string());
            }
        }

        let mut warnings: Vec<DataQualityWarning> = products
            .into_iter()
            .map(|raw| {
                DataQualityWarning::warning(
                    raw,
                    "產品引用無法對應ID或名稱，歸入未識別SKU".to_string(),
                )
            })
            .chain(lines.into_iter().map(|raw| {
                DataQualityWarning::warning(raw, "產線引用無法對應ID或名稱".to_string())
            }))
            .collect();

        if unparsable_durations > 0 {
            warnings.push(DataQualityWarning::new(
                "stops".to_string(),
                format!("{} 筆停機時長無法解析，以 0 分鐘計", unparsable_durations),
                WarningSeverity::Info,
            ));
        }

        for warning in &warnings {
            tracing::warn!("資料品質: {} - {}", warning.subject, warning.message);
        }

        warnings
    }

    pub fn products(&self) -> &ProductCatalog {
        &self.products
    }

    pub fn lines(&self) -> &LineCatalog {
        &self.lines
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn records(&self) -> &[ProductionRecord] {
        &self.records
    }

    pub fn weekly_plan(&self) -> &[WeeklyPlanEntry] {
        &self.weekly_plan
    }

    pub fn warnings(&self) -> &[DataQualityWarning] {
        &self.warnings
    }

    pub fn order(&self, order_id: &Uuid) -> Option<&Order> {
        self.orders.iter().find(|o| &o.id == order_id)
    }

    /// 符合篩選條件的生產紀錄
    pub fn records_matching<'a>(
        &'a self,
        filter: &'a RecordFilter,
    ) -> impl Iterator<Item = &'a ProductionRecord> + 'a {
        self.records.iter().filter(move |r| filter.matches(r))
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
            && self.orders.is_empty()
            && self.records.is_empty()
            && self.weekly_plan.is_empty()
    }
}

/// 有值但解析結果為 0 且原文不是 0 的時長
fn is_unparsable(raw: Option<&RawDuration>) -> bool {
    match raw {
        Some(RawDuration::Text(text)) => parse_duration(raw) == 0 && !text.trim().starts_with('0'),
        Some(RawDuration::Other(value)) => !value.is_null(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use shiftboard_core::{OrderStatus, ProductKey, RawStopEvent};

    fn raw_snapshot() -> RawSnapshot {
        let day = NaiveDate::from_ymd_opt(2025, 11, 3).unwrap();
        RawSnapshot {
            products: vec![Product::new("SKU-001", "Water 500ml", Decimal::from(7200))],
            lines: vec![Line::new("L1", "Line 1")],
            orders: vec![
                RawOrder::new("ACME", day, OrderStatus::Pending)
                    .with_line("Old Soda", Decimal::from(10)),
            ],
            records: vec![
                RawProductionRecord::new(day, "A", "L1", "Water 500ml", Decimal::from(100))
                    .with_stops(vec![
                        RawStopEvent::with_duration("n/a"),
                        RawStopEvent::with_duration(5u32),
                    ]),
                RawProductionRecord::new(day, "B", "Line 9", "SKU-001", Decimal::from(50)),
            ],
            weekly_plan: vec![RawWeeklyPlanEntry::new("SKU-001", day, Decimal::from(500))],
        }
    }

    #[test]
    fn test_from_raw_normalizes_once() {
        let snapshot = Snapshot::from_raw(raw_snapshot(), &EngineConfig::default());

        assert_eq!(snapshot.records().len(), 2);
        assert_eq!(snapshot.records()[0].product, ProductKey::Known("SKU-001".to_string()));
        assert_eq!(snapshot.records()[0].stops[0].minutes, 0);
        assert_eq!(snapshot.records()[0].stops[1].minutes, 5);
        assert_eq!(
            snapshot.orders()[0].lines[0].product,
            ProductKey::Unidentified("Old Soda".to_string())
        );
    }

    #[test]
    fn test_warnings_collected() {
        let snapshot = Snapshot::from_raw(raw_snapshot(), &EngineConfig::default());
        let subjects: Vec<&str> = snapshot.warnings().iter().map(|w| w.subject.as_str()).collect();

        assert_eq!(subjects, vec!["Old Soda", "Line 9", "stops"]);
        assert_eq!(snapshot.warnings()[2].severity, WarningSeverity::Info);
    }

    #[test]
    fn test_records_matching() {
        let snapshot = Snapshot::from_raw(raw_snapshot(), &EngineConfig::default());
        let filter = RecordFilter::all().with_line("L1");

        assert_eq!(snapshot.records_matching(&filter).count(), 1);
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = Snapshot::empty();

        assert!(snapshot.is_empty());
        assert!(snapshot.order(&Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_is_unparsable() {
        assert!(is_unparsable(Some(&RawDuration::Text("n/a".to_string()))));
        assert!(!is_unparsable(Some(&RawDuration::Text("0 min".to_string()))));
        assert!(!is_unparsable(Some(&RawDuration::Number(0.0))));
        assert!(!is_unparsable(None));
    }
}
