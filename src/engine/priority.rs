// ==========================================
// 钢结构车间产能预测 - 项目排序引擎
// ==========================================
// 职责: 已签约 / 待定两个列表各自独立排序
// 输入: 项目需求列表 (不修改)
// 输出: 排序后的项目引用列表
// ==========================================

use crate::domain::project::ProjectDemand;
use crate::domain::types::DemandKind;
use std::cmp::Ordering;

/// 待定项目缺失优先级时的有效优先级
pub const PENDING_DEFAULT_PRIORITY: i32 = 999;

// ==========================================
// ProjectSorter - 项目排序引擎
// ==========================================
pub struct ProjectSorter {
    // 无状态引擎,不需要注入依赖
}

impl ProjectSorter {
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 排序项目列表
    ///
    /// 排序键:
    /// 1) 有开工日 (scheduled 否则 projected) 的排在无开工日之前
    /// 2) 有开工日: 开工日升序 (同日保持输入顺序)
    /// 3) 无开工日: 优先级升序, 无优先级排最后, 再按名称字典序 (区分大小写)
    /// 4) 待定项目无优先级时按 999 处理
    ///
    /// 已归档项目在排序前剔除。
    pub fn sort<'a>(&self, projects: &'a [ProjectDemand], kind: DemandKind) -> Vec<&'a ProjectDemand> {
        let mut sorted: Vec<&ProjectDemand> = projects.iter().filter(|p| !p.archived).collect();
        // sort_by 为稳定排序, 同日项目保持输入顺序
        sorted.sort_by(|a, b| self.compare(a, b, kind));
        sorted
    }

    /// 比较两个项目
    pub fn compare(&self, a: &ProjectDemand, b: &ProjectDemand, kind: DemandKind) -> Ordering {
        match (a.start_date(), b.start_date()) {
            (Some(da), Some(db)) => da.cmp(&db),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => {
                let pa = effective_priority(a, kind);
                let pb = effective_priority(b, kind);
                compare_priority(pa, pb).then_with(|| a.name.cmp(&b.name))
            }
        }
    }
}

impl Default for ProjectSorter {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 辅助函数
// ==========================================

/// 有效优先级
///
/// - 已签约: 原值 (None 表示最低)
/// - 待定: 缺失时取 PENDING_DEFAULT_PRIORITY
fn effective_priority(project: &ProjectDemand, kind: DemandKind) -> Option<i32> {
    match kind {
        DemandKind::Committed => project.priority,
        DemandKind::Pending => Some(project.priority.unwrap_or(PENDING_DEFAULT_PRIORITY)),
    }
}

/// 优先级升序, None 排最后
fn compare_priority(a: Option<i32>, b: Option<i32>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
