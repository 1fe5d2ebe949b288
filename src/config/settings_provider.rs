// ==========================================
// 钢结构车间产能预测 - 公司配置读取 Trait
// ==========================================
// 职责: 定义预测所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::company_settings::CompanySettings;
use async_trait::async_trait;
use std::error::Error;

// ==========================================
// CompanySettingsProvider Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
//        StaticSettingsProvider（内存固定值, 测试/嵌入场景）
#[async_trait]
pub trait CompanySettingsProvider: Send + Sync {
    /// 获取车间基础周产能（小时）
    ///
    /// # 默认值
    /// - 0.0
    async fn get_base_weekly_capacity_hours(&self) -> Result<f64, Box<dyn Error + Send + Sync>>;

    /// 获取默认预测周数
    ///
    /// # 默认值
    /// - 24
    async fn get_forecast_weeks(&self) -> Result<i32, Box<dyn Error + Send + Sync>>;

    /// 获取低利用率阈值
    ///
    /// # 默认值
    /// - 0.70
    async fn get_under_utilized_threshold(&self) -> Result<f64, Box<dyn Error + Send + Sync>>;

    /// 一次性读取全部配置
    async fn load_settings(&self) -> Result<CompanySettings, Box<dyn Error + Send + Sync>> {
        Ok(CompanySettings {
            base_weekly_capacity_hours: Some(self.get_base_weekly_capacity_hours().await?),
            forecast_weeks: Some(self.get_forecast_weeks().await?),
            under_utilized_threshold: Some(self.get_under_utilized_threshold().await?),
        })
    }
}

// ==========================================
// StaticSettingsProvider - 固定配置
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct StaticSettingsProvider {
    settings: CompanySettings,
}

impl StaticSettingsProvider {
    pub fn new(settings: CompanySettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl CompanySettingsProvider for StaticSettingsProvider {
    async fn get_base_weekly_capacity_hours(&self) -> Result<f64, Box<dyn Error + Send + Sync>> {
        Ok(self.settings.base_weekly_capacity())
    }

    async fn get_forecast_weeks(&self) -> Result<i32, Box<dyn Error + Send + Sync>> {
        Ok(self.settings.forecast_weeks())
    }

    async fn get_under_utilized_threshold(&self) -> Result<f64, Box<dyn Error + Send + Sync>> {
        Ok(self.settings.under_utilized_threshold())
    }
}
