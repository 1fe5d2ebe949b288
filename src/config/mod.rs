// ==========================================
// 钢结构车间产能预测 - 配置层
// ==========================================
// 职责: 公司配置管理, 预测参数默认值
// 存储: config_kv 表
// ==========================================

pub mod company_settings;
pub mod config_manager;
pub mod settings_provider;

// 重导出核心配置管理器
pub use company_settings::{
    CompanySettings, DEFAULT_BASE_WEEKLY_CAPACITY_HOURS, DEFAULT_FORECAST_WEEKS,
    DEFAULT_UNDER_UTILIZED_THRESHOLD,
};
pub use config_manager::{config_keys, ConfigManager};
pub use settings_provider::{CompanySettingsProvider, StaticSettingsProvider};
