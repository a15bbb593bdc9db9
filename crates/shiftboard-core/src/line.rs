//! 產線模型

use serde::{Deserialize, Serialize};

/// 產線（僅用於彙總範圍，不持有計算狀態）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    /// 產線ID
    pub id: String,

    /// 顯示名稱
    pub name: String,
}

impl Line {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// 解析後的產線鍵
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LineKey {
    Known(String),
    Unidentified(String),
}

impl LineKey {
    pub fn label(&self) -> &str {
        match self {
            LineKey::Known(id) | LineKey::Unidentified(id) => id,
        }
    }

    /// 檢查是否符合查詢用的產線ID
    ///
    /// 未識別的產線以原始引用比對。
    pub fn matches(&self, line_id: &str) -> bool {
        self.label() == line_id
    }
}
