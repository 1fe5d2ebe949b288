// ==========================================
// 钢结构车间产能预测 - 数据仓储层
// ==========================================
// 职责: 项目数据访问
// 红线: Repository 不含业务逻辑
// ==========================================

pub mod error;
pub mod project_repo;

// 重导出
pub use error::{RepositoryError, RepositoryResult};
pub use project_repo::ProjectRepository;
