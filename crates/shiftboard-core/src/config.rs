//! 計算引擎配置

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Result, ShiftboardError};

/// 計算引擎參數
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 報工缺少或非正數工作時數時的預設值
    pub default_hours_worked: Decimal,

    /// 標準產能的基準班長（小時）
    pub nominal_shift_hours: Decimal,

    /// 快照結存以標準產能的比例作為期初庫存
    pub snapshot_seed_fraction: Decimal,

    /// 週目標：剩餘天數小於等於此值時才可能判定落後
    pub late_window_days: u32,

    /// 週目標：進度低於此百分比判定落後
    pub late_progress_threshold: Decimal,

    /// 週目標：進度達到此百分比判定完成
    pub completed_threshold: Decimal,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_hours_worked: Decimal::from(8),
            nominal_shift_hours: Decimal::from(8),
            snapshot_seed_fraction: Decimal::new(15, 2),
            late_window_days: 2,
            late_progress_threshold: Decimal::from(50),
            completed_threshold: Decimal::from(100),
        }
    }
}

impl EngineConfig {
    /// 從 JSON 載入（缺少的欄位使用預設值）
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 建構器模式：設置預設工作時數
    pub fn with_default_hours_worked(mut self, hours: Decimal) -> Self {
        self.default_hours_worked = hours;
        self
    }

    /// 建構器模式：設置快照期初比例
    pub fn with_snapshot_seed_fraction(mut self, fraction: Decimal) -> Self {
        self.snapshot_seed_fraction = fraction;
        self
    }

    /// 建構器模式：設置落後判定
    pub fn with_late_rule(mut self, window_days: u32, progress_threshold: Decimal) -> Self {
        self.late_window_days = window_days;
        self.late_progress_threshold = progress_threshold;
        self
    }

    /// 檢查參數
    pub fn validate(&self) -> Result<()> {
        if self.default_hours_worked <= Decimal::ZERO {
            return Err(ShiftboardError::InvalidConfig(format!(
                "預設工作時數必須為正數: {}",
                self.default_hours_worked
            )));
        }
        if self.nominal_shift_hours <= Decimal::ZERO {
            return Err(ShiftboardError::InvalidConfig(format!(
                "標準班長必須為正數: {}",
                self.nominal_shift_hours
            )));
        }
        if self.snapshot_seed_fraction < Decimal::ZERO
            || self.snapshot_seed_fraction > Decimal::ONE
        {
            return Err(ShiftboardError::InvalidConfig(format!(
                "快照期初比例需介於 0 與 1: {}",
                self.snapshot_seed_fraction
            )));
        }
        if self.completed_threshold <= Decimal::ZERO {
            return Err(ShiftboardError::InvalidConfig(format!(
                "完成門檻必須為正數: {}",
                self.completed_threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();

        assert_eq!(config.default_hours_worked, Decimal::from(8));
        assert_eq!(config.snapshot_seed_fraction, Decimal::new(15, 2));
        assert_eq!(config.late_window_days, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_partial_json() {
        let config = EngineConfig::from_json_str(r#"{"late_window_days": 3}"#).unwrap();

        assert_eq!(config.late_window_days, 3);
        assert_eq!(config.nominal_shift_hours, Decimal::from(8));
    }

    #[test]
    fn test_config_rejects_invalid_values() {
        assert!(EngineConfig::from_json_str(r#"{"snapshot_seed_fraction": 1.5}"#).is_err());
        assert!(EngineConfig::from_json_str(r#"{"default_hours_worked": 0}"#).is_err());
        assert!(EngineConfig::from_json_str("not json").is_err());
    }

    #[test]
    fn test_config_builder() {
        let config = EngineConfig::default()
            .with_default_hours_worked(Decimal::from(12))
            .with_snapshot_seed_fraction(Decimal::new(2, 1))
            .with_late_rule(1, Decimal::from(40));

        assert_eq!(config.default_hours_worked, Decimal::from(12));
        assert_eq!(config.snapshot_seed_fraction, Decimal::new(2, 1));
        assert_eq!(config.late_window_days, 1);
        assert_eq!(config.late_progress_threshold, Decimal::from(40));
    }
}
