// ==========================================
// 钢结构车间产能预测 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 决策支持 (接单与排班参考, 不做可行性保证)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 周桶构建 / 分配 / 利用率分析
pub mod engine;

// 导入层 - 外部项目清单
pub mod importer;

// 配置层 - 公司配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 对外接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    BookingRecommendation, BucketAllocation, DemandKind, ForecastGap, ForecastOptions,
    ForecastSummary, ProjectDemand, ProjectRecord, ScenarioEcho, WeekBucket,
};

// 配置
pub use config::{CompanySettings, CompanySettingsProvider, ConfigManager};

// 引擎
pub use engine::{
    build_forecast, BucketBuilder, CapacityAllocator, ForecastEngine, ProjectSorter,
    UtilizationAnalyzer,
};

// API
pub use api::{ForecastApi, ForecastRequest, ForecastResponse};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "钢结构车间产能预测";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
