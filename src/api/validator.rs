// ==========================================
// 钢结构车间产能预测 - 请求校验器
// ==========================================
// 职责: 外部输入的形状校验 (引擎内部不做校验, 只做降级)
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{config_keys, CompanySettings};
use serde::{Deserialize, Serialize};
use chrono::NaiveDate;

/// 预测窗口上限 (5 年)
pub const MAX_FORECAST_WEEKS: i32 = 260;

// ==========================================
// ForecastRequest - 预测请求
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastRequest {
    #[serde(default)]
    pub shift_multiplier: Option<f64>, // 班次倍率 (缺省 1.0)
    #[serde(default)]
    pub weeks: Option<i32>,            // 预测周数 (缺省取公司配置)
    #[serde(default)]
    pub start_date: Option<NaiveDate>, // 起点 (缺省今天, 对齐到周一)
    #[serde(default)]
    pub threshold: Option<f64>,        // 低利用率阈值覆写
}

/// 校验预测请求
///
/// 规则:
/// - weeks ∈ [1, 260]
/// - shift_multiplier 为有限值且 ≥ 0
/// - threshold ∈ (0, 1]
pub fn validate_forecast_request(request: &ForecastRequest) -> ApiResult<()> {
    if let Some(weeks) = request.weeks {
        if !weeks_in_range(weeks) {
            return Err(ApiError::InvalidInput(format!(
                "预测周数必须在 1..={} 之间, 实际 {}",
                MAX_FORECAST_WEEKS, weeks
            )));
        }
    }

    if let Some(multiplier) = request.shift_multiplier {
        validate_shift_multiplier(multiplier)?;
    }

    if let Some(threshold) = request.threshold {
        if !threshold_in_range(threshold) {
            return Err(ApiError::InvalidInput(format!(
                "低利用率阈值必须在 (0, 1] 之间, 实际 {}",
                threshold
            )));
        }
    }

    Ok(())
}

/// 校验请求缺省项回落到公司配置后的取值
///
/// 配置表可被直接写入, 越界值按配置错误返回, 不进入引擎。
pub fn validate_resolved_settings(
    request: &ForecastRequest,
    settings: &CompanySettings,
) -> ApiResult<()> {
    if request.weeks.is_none() {
        let weeks = settings.forecast_weeks();
        if !weeks_in_range(weeks) {
            return Err(ApiError::ConfigError(format!(
                "配置项 {} 必须在 1..={} 之间, 实际 {}",
                config_keys::FORECAST_WEEKS,
                MAX_FORECAST_WEEKS,
                weeks
            )));
        }
    }

    if request.threshold.is_none() {
        let threshold = settings.under_utilized_threshold();
        if !threshold_in_range(threshold) {
            return Err(ApiError::ConfigError(format!(
                "配置项 {} 必须在 (0, 1] 之间, 实际 {}",
                config_keys::UNDER_UTILIZED_THRESHOLD,
                threshold
            )));
        }
    }

    Ok(())
}

fn weeks_in_range(weeks: i32) -> bool {
    (1..=MAX_FORECAST_WEEKS).contains(&weeks)
}

fn threshold_in_range(threshold: f64) -> bool {
    threshold.is_finite() && threshold > 0.0 && threshold <= 1.0
}

/// 校验班次倍率
pub fn validate_shift_multiplier(multiplier: f64) -> ApiResult<()> {
    if !multiplier.is_finite() || multiplier < 0.0 {
        return Err(ApiError::InvalidInput(format!(
            "班次倍率必须为非负有限值, 实际 {}",
            multiplier
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_request_is_valid() {
        assert!(validate_forecast_request(&ForecastRequest::default()).is_ok());
    }

    #[test]
    fn test_weeks_bounds() {
        for weeks in [0, -3, 261] {
            let request = ForecastRequest {
                weeks: Some(weeks),
                ..Default::default()
            };
            assert!(matches!(
                validate_forecast_request(&request),
                Err(ApiError::InvalidInput(_))
            ));
        }

        let request = ForecastRequest {
            weeks: Some(260),
            ..Default::default()
        };
        assert!(validate_forecast_request(&request).is_ok());
    }

    #[test]
    fn test_shift_multiplier_bounds() {
        assert!(validate_shift_multiplier(0.0).is_ok());
        assert!(validate_shift_multiplier(2.5).is_ok());
        assert!(validate_shift_multiplier(-0.5).is_err());
        assert!(validate_shift_multiplier(f64::NAN).is_err());
        assert!(validate_shift_multiplier(f64::INFINITY).is_err());
    }

    #[test]
    fn test_threshold_bounds() {
        for threshold in [0.0, 1.2, f64::NAN] {
            let request = ForecastRequest {
                threshold: Some(threshold),
                ..Default::default()
            };
            assert!(validate_forecast_request(&request).is_err());
        }

        let request = ForecastRequest {
            threshold: Some(1.0),
            ..Default::default()
        };
        assert!(validate_forecast_request(&request).is_ok());
    }

    fn settings(weeks: Option<i32>, threshold: Option<f64>) -> CompanySettings {
        CompanySettings {
            base_weekly_capacity_hours: Some(400.0),
            forecast_weeks: weeks,
            under_utilized_threshold: threshold,
        }
    }

    #[test]
    fn test_resolved_settings_out_of_range() {
        let request = ForecastRequest::default();

        for (weeks, threshold) in [(Some(-5), None), (Some(100_000), None), (None, Some(5.0))] {
            assert!(matches!(
                validate_resolved_settings(&request, &settings(weeks, threshold)),
                Err(ApiError::ConfigError(_))
            ));
        }

        assert!(validate_resolved_settings(&request, &settings(None, None)).is_ok());
        assert!(validate_resolved_settings(&request, &settings(Some(260), Some(1.0))).is_ok());
    }

    #[test]
    fn test_request_values_override_bad_settings() {
        // 请求已显式给出时不看配置值
        let request = ForecastRequest {
            weeks: Some(4),
            threshold: Some(0.5),
            ..Default::default()
        };
        assert!(validate_resolved_settings(&request, &settings(Some(0), Some(5.0))).is_ok());
    }
}
