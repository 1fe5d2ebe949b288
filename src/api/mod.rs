// ==========================================
// 钢结构车间产能预测 - API 层
// ==========================================
// 职责: 对外接口, 请求校验, 错误转换
// ==========================================

pub mod error;
pub mod forecast_api;
pub mod validator;

// 重导出
pub use error::{ApiError, ApiResult};
pub use forecast_api::{unscheduled_hours, ForecastApi, ForecastResponse, UnscheduledHours};
pub use validator::{
    validate_forecast_request, validate_resolved_settings, ForecastRequest, MAX_FORECAST_WEEKS,
};
