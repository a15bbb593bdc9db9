//! 正規化：將資料來源的鬆散欄位一次轉換為強型別值

use chrono::NaiveTime;
use rust_decimal::Decimal;
use shiftboard_core::{
    EngineConfig, Line, LineKey, Order, OrderLine, Product, ProductKey, ProductionRecord,
    RawDuration, RawOrder, RawProductionRecord, RawStopEvent, RawWeeklyPlanEntry, StopEvent,
    StopType, WeeklyPlanEntry,
};
use std::collections::HashMap;
use uuid::Uuid;

/// 空白設備/原因標籤的替代值
pub const UNSPECIFIED_LABEL: &str = "Unspecified";

/// 解析停機時長（分鐘）
///
/// 數字取整並下限為 0；文字取第一段連續數字；其餘一律為 0。
pub fn parse_duration(value: Option<&RawDuration>) -> u32 {
    match value {
        Some(RawDuration::Number(n)) => {
            if n.is_finite() && *n > 0.0 {
                // `as` 轉換在超過上限時飽和
                n.floor() as u32
            } else {
                0
            }
        }
        Some(RawDuration::Text(text)) => first_digit_run(text),
        Some(RawDuration::Other(_)) | None => 0,
    }
}

fn first_digit_run(text: &str) -> u32 {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse::<u32>().unwrap_or(0)
}

/// 解析時間（"HH:MM:SS" 或 "HH:MM"）
pub fn parse_time_of_day(value: Option<&str>) -> Option<NaiveTime> {
    let value = value?.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .ok()
}

fn clean_label(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(label) if !label.is_empty() => label.to_string(),
        _ => UNSPECIFIED_LABEL.to_string(),
    }
}

/// 可依 ID 或名稱查找的主檔項目
pub trait CatalogEntry {
    fn entry_id(&self) -> &str;
    fn entry_name(&self) -> &str;
}

impl CatalogEntry for Product {
    fn entry_id(&self) -> &str {
        &self.id
    }

    fn entry_name(&self) -> &str {
        &self.name
    }
}

impl CatalogEntry for Line {
    fn entry_id(&self) -> &str {
        &self.id
    }

    fn entry_name(&self) -> &str {
        &self.name
    }
}

/// 主檔索引（先比對 ID，再比對名稱）
#[derive(Debug, Clone)]
pub struct Catalog<T> {
    entries: Vec<T>,
    by_id: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
}

pub type ProductCatalog = Catalog<Product>;
pub type LineCatalog = Catalog<Line>;

impl<T: CatalogEntry> Catalog<T> {
    /// 建立索引（重複的 ID 或名稱以第一筆為準）
    pub fn new(entries: Vec<T>) -> Self {
        let mut by_id = HashMap::new();
        let mut by_name = HashMap::new();
        for (idx, entry) in entries.iter().enumerate() {
            by_id.entry(entry.entry_id().to_string()).or_insert(idx);
            by_name.entry(entry.entry_name().to_string()).or_insert(idx);
        }
        Self {
            entries,
            by_id,
            by_name,
        }
    }

    /// 依 ID 查找
    pub fn get(&self, id: &str) -> Option<&T> {
        self.by_id.get(id).map(|&idx| &self.entries[idx])
    }

    /// 依引用查找：先比對 ID，再精確比對名稱（相容舊資料）
    pub fn lookup(&self, reference: &str) -> Option<&T> {
        self.by_id
            .get(reference)
            .or_else(|| self.by_name.get(reference))
            .map(|&idx| &self.entries[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: CatalogEntry> Default for Catalog<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Catalog<Product> {
    /// 解析產品引用
    pub fn resolve(&self, reference: &str) -> ProductKey {
        match self.lookup(reference) {
            Some(product) => ProductKey::Known(product.id.clone()),
            None => ProductKey::Unidentified(reference.to_string()),
        }
    }

    /// 取得已解析鍵對應的產品
    pub fn product(&self, key: &ProductKey) -> Option<&Product> {
        key.product_id().and_then(|id| self.get(id))
    }
}

impl Catalog<Line> {
    /// 解析產線引用
    pub fn resolve(&self, reference: &str) -> LineKey {
        match self.lookup(reference) {
            Some(line) => LineKey::Known(line.id.clone()),
            None => LineKey::Unidentified(reference.to_string()),
        }
    }
}

/// 解析產品引用（無法辨識時回傳未識別 SKU）
pub fn resolve_product(reference: &str, catalog: &ProductCatalog) -> ProductKey {
    catalog.resolve(reference)
}

/// 解析產線引用
pub fn resolve_line(reference: &str, lines: &LineCatalog) -> LineKey {
    lines.resolve(reference)
}

/// 正規化器
pub struct Normalizer<'a> {
    products: &'a ProductCatalog,
    lines: &'a LineCatalog,
    config: &'a EngineConfig,
}

impl<'a> Normalizer<'a> {
    pub fn new(
        products: &'a ProductCatalog,
        lines: &'a LineCatalog,
        config: &'a EngineConfig,
    ) -> Self {
        Self {
            products,
            lines,
            config,
        }
    }

    /// 正規化停機事件
    pub fn stop_event(&self, raw: &RawStopEvent) -> StopEvent {
        StopEvent {
            stop_type: StopType::from_label(raw.stop_type.as_deref()),
            equipment: clean_label(raw.equipment.as_deref()),
            reason: clean_label(raw.reason.as_deref()),
            minutes: parse_duration(raw.duration.as_ref()),
            start: parse_time_of_day(raw.start.as_deref()),
            end: parse_time_of_day(raw.end.as_deref()),
        }
    }

    /// 正規化生產紀錄
    pub fn production_record(&self, raw: &RawProductionRecord) -> ProductionRecord {
        let hours_worked = match raw.hours_worked {
            Some(hours) if hours > Decimal::ZERO => hours,
            _ => self.config.default_hours_worked,
        };

        ProductionRecord {
            id: raw.id.unwrap_or_else(Uuid::new_v4),
            date: raw.date,
            shift: raw.shift.trim().to_string(),
            line: self.lines.resolve(&raw.line),
            product: self.products.resolve(&raw.product),
            quantity: raw.quantity.unwrap_or(Decimal::ZERO).max(Decimal::ZERO),
            hours_worked,
            nominal_capacity: raw.nominal_capacity.filter(|c| *c > Decimal::ZERO),
            stops: raw.stops.iter().map(|s| self.stop_event(s)).collect(),
            notes: raw.notes.clone().unwrap_or_default(),
        }
    }

    /// 正規化訂單
    pub fn order(&self, raw: &RawOrder) -> Order {
        Order {
            id: raw.id,
            customer: raw.customer.clone(),
            delivery_date: raw.delivery_date,
            status: raw.status,
            lines: raw
                .lines
                .iter()
                .map(|l| {
                    OrderLine::new(self.products.resolve(&l.product), l.quantity.max(Decimal::ZERO))
                })
                .collect(),
        }
    }

    /// 正規化週計劃明細
    pub fn plan_entry(&self, raw: &RawWeeklyPlanEntry) -> WeeklyPlanEntry {
        WeeklyPlanEntry::new(
            self.products.resolve(&raw.product),
            raw.target_day,
            raw.planned_quantity.max(Decimal::ZERO),
        )
    }
}
