// ==========================================
// 钢结构车间产能预测 - 引擎层
// ==========================================
// 职责: 周桶构建、项目排序、产能分配、利用率分析
// 红线: Engine 不访问数据库, 不返回错误, 缺失数据按默认值降级
// ==========================================

pub mod allocator;
pub mod bucket_builder;
pub mod forecast;
pub mod priority;
pub mod utilization;

// 重导出核心引擎
pub use allocator::{AllocationReport, CapacityAllocator, ProjectAllocation};
pub use bucket_builder::{effective_weekly_capacity, week_start, BucketBuilder};
pub use forecast::{build_forecast, ForecastEngine, ForecastRun};
pub use priority::{ProjectSorter, PENDING_DEFAULT_PRIORITY};
pub use utilization::{backlog_months, DemandTotals, UtilizationAnalyzer, WEEKS_PER_MONTH};
