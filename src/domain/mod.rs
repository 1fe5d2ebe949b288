// ==========================================
// 钢结构车间产能预测 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、产能约束接口
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod capacity;
pub mod forecast;
pub mod project;
pub mod types;

// 重导出核心类型
pub use capacity::CapacityConstraint;
pub use forecast::{
    BookingRecommendation, BucketAllocation, ForecastGap, ForecastOptions, ForecastSummary,
    ScenarioEcho, WeekBucket,
};
pub use project::{resolve_remaining_hours, ProjectDemand, ProjectRecord};
pub use types::DemandKind;
