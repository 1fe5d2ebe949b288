// ==========================================
// 钢结构车间产能预测 - 公司配置
// ==========================================
// 存储: config_kv (scope_id='global')
// 缺失或非有限值回落到默认值
// ==========================================

use serde::{Deserialize, Serialize};

/// 默认周产能（小时）
pub const DEFAULT_BASE_WEEKLY_CAPACITY_HOURS: f64 = 0.0;

/// 默认预测周数
pub const DEFAULT_FORECAST_WEEKS: i32 = 24;

/// 默认低利用率阈值
pub const DEFAULT_UNDER_UTILIZED_THRESHOLD: f64 = 0.70;

/// 公司级产能配置
///
/// 所有字段均可缺失，缺失时取上面的默认值。
/// 存储位置：config_kv（scope_id='global'）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanySettings {
    /// 车间基础周产能（制作工时）
    #[serde(default)]
    pub base_weekly_capacity_hours: Option<f64>,

    /// 默认预测周数
    #[serde(default, alias = "weeks")]
    pub forecast_weeks: Option<i32>,

    /// 低利用率阈值（0~1）
    #[serde(default)]
    pub under_utilized_threshold: Option<f64>,
}

impl CompanySettings {
    pub fn base_weekly_capacity(&self) -> f64 {
        self.base_weekly_capacity_hours
            .filter(|h| h.is_finite())
            .unwrap_or(DEFAULT_BASE_WEEKLY_CAPACITY_HOURS)
    }

    pub fn forecast_weeks(&self) -> i32 {
        self.forecast_weeks.unwrap_or(DEFAULT_FORECAST_WEEKS)
    }

    pub fn under_utilized_threshold(&self) -> f64 {
        self.under_utilized_threshold
            .filter(|t| t.is_finite())
            .unwrap_or(DEFAULT_UNDER_UTILIZED_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_missing() {
        let settings = CompanySettings::default();
        assert_eq!(settings.base_weekly_capacity(), 0.0);
        assert_eq!(settings.forecast_weeks(), 24);
        assert_eq!(settings.under_utilized_threshold(), 0.70);
    }

    #[test]
    fn test_deserialize_partial_json() {
        let settings: CompanySettings =
            serde_json::from_str(r#"{"baseWeeklyCapacityHours": 400, "weeks": 12}"#).unwrap();
        assert_eq!(settings.base_weekly_capacity(), 400.0);
        assert_eq!(settings.forecast_weeks(), 12);
        assert_eq!(settings.under_utilized_threshold(), 0.70);
    }
}
