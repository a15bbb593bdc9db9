//! 設備/原因分類表
//!
//! 依序比對（不分大小寫的子字串包含），第一個符合的規則決定分類，
//! 全部不符合時落入保底分類。

use serde::{Deserialize, Serialize};

/// 分類規則
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRule<C> {
    /// 比對字串（已轉小寫）
    pub matchers: Vec<String>,
    pub category: C,
}

impl<C> ClassificationRule<C> {
    fn matches(&self, lowered: &str) -> bool {
        self.matchers.iter().any(|m| lowered.contains(m.as_str()))
    }
}

/// 有序分類表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationTable<C> {
    rules: Vec<ClassificationRule<C>>,
    fallback: C,
}

impl<C: Clone> ClassificationTable<C> {
    /// 創建只有保底分類的空表
    pub fn new(fallback: C) -> Self {
        Self {
            rules: Vec::new(),
            fallback,
        }
    }

    /// 建構器模式：追加規則（空白比對字串會被忽略）
    pub fn with_rule(mut self, matchers: &[&str], category: C) -> Self {
        let matchers = matchers
            .iter()
            .map(|m| m.trim().to_lowercase())
            .filter(|m| !m.is_empty())
            .collect();
        self.rules.push(ClassificationRule { matchers, category });
        self
    }

    /// 分類標籤
    pub fn classify(&self, label: &str) -> C {
        let lowered = label.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map(|rule| rule.category.clone())
            .unwrap_or_else(|| self.fallback.clone())
    }

    pub fn rules(&self) -> &[ClassificationRule<C>] {
        &self.rules
    }

    pub fn fallback(&self) -> &C {
        &self.fallback
    }
}

/// 設備分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EquipmentCategory {
    Mixer,
    Filler,
    Capper,
    Labeler,
    Palletizer,
    Packer,
    Conveyor,
    Utilities,
    Other,
}

impl EquipmentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentCategory::Mixer => "Mixer",
            EquipmentCategory::Filler => "Filler",
            EquipmentCategory::Capper => "Capper",
            EquipmentCategory::Labeler => "Labeler",
            EquipmentCategory::Palletizer => "Palletizer",
            EquipmentCategory::Packer => "Packer",
            EquipmentCategory::Conveyor => "Conveyor",
            EquipmentCategory::Utilities => "Utilities",
            EquipmentCategory::Other => "Other",
        }
    }

    /// 預設設備分類表
    ///
    /// 棧板機排在包裝機之前，"pallet wrapper" 歸棧板機。
    pub fn default_table() -> ClassificationTable<EquipmentCategory> {
        ClassificationTable::new(EquipmentCategory::Other)
            .with_rule(&["mixer", "blend", "tank"], EquipmentCategory::Mixer)
            .with_rule(&["fill", "doser"], EquipmentCategory::Filler)
            .with_rule(&["capper", "capping", "seal"], EquipmentCategory::Capper)
            .with_rule(&["label"], EquipmentCategory::Labeler)
            .with_rule(&["pallet"], EquipmentCategory::Palletizer)
            .with_rule(&["pack", "wrap", "carton", "box"], EquipmentCategory::Packer)
            .with_rule(&["conveyor", "belt", "transfer"], EquipmentCategory::Conveyor)
            .with_rule(
                &["compressor", "boiler", "chiller", "power", "utility", "utilities"],
                EquipmentCategory::Utilities,
            )
    }
}

/// 停機原因分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReasonCategory {
    Mechanical,
    Electrical,
    Material,
    Quality,
    Operational,
    Other,
}

impl ReasonCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCategory::Mechanical => "Mechanical",
            ReasonCategory::Electrical => "Electrical",
            ReasonCategory::Material => "Material",
            ReasonCategory::Quality => "Quality",
            ReasonCategory::Operational => "Operational",
            ReasonCategory::Other => "Other",
        }
    }

    /// 預設原因分類表
    pub fn default_table() -> ClassificationTable<ReasonCategory> {
        ClassificationTable::new(ReasonCategory::Other)
            .with_rule(
                &["sensor", "electric", "fuse", "plc", "motor trip"],
                ReasonCategory::Electrical,
            )
            .with_rule(
                &["jam", "bearing", "leak", "broken", "wear", "mechanic"],
                ReasonCategory::Mechanical,
            )
            .with_rule(&["material", "shortage", "missing", "supply"], ReasonCategory::Material)
            .with_rule(&["quality", "reject", "defect", "inspection"], ReasonCategory::Quality)
            .with_rule(
                &["operator", "cleaning", "setup", "adjust", "meeting", "training"],
                ReasonCategory::Operational,
            )
    }
}
