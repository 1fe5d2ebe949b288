// ==========================================
// 钢结构车间产能预测 - 周产能分配引擎
// ==========================================
// 红线: 已签约项目全部分配完成后才开始分配待定项目
// 红线: 单周分配不超过该周剩余产能
// ==========================================
// 职责: 贪心地把项目剩余工时从开工周起逐周填入
// 输入: 周桶 (会被修改) + 两个已排序项目列表
// 输出: 周桶 used_hours / allocations 更新 + 分配报告
// ==========================================

use crate::domain::capacity::CapacityConstraint;
use crate::domain::forecast::WeekBucket;
use crate::domain::project::ProjectDemand;
use crate::domain::types::DemandKind;
use crate::engine::bucket_builder::{week_start, DAYS_PER_WEEK};
use chrono::NaiveDate;
use tracing::{debug, instrument, warn};

/// 单个项目的分配结果
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectAllocation {
    pub project_id: String,
    pub kind: DemandKind,
    pub demand_hours: f64,           // 原始需求
    pub allocated_hours: f64,        // 实际落入周桶
    pub start_index: i64,            // 计算得到的开工周序号
}

impl ProjectAllocation {
    /// 超出预测窗口、未能落位的工时
    pub fn unplaced_hours(&self) -> f64 {
        (self.demand_hours - self.allocated_hours).max(0.0)
    }
}

/// 一次分配的汇总报告
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllocationReport {
    pub projects: Vec<ProjectAllocation>,
}

impl AllocationReport {
    pub fn unplaced_hours(&self, kind: DemandKind) -> f64 {
        self.projects
            .iter()
            .filter(|p| p.kind == kind)
            .map(|p| p.unplaced_hours())
            .sum()
    }

    pub fn allocated_hours(&self, kind: DemandKind) -> f64 {
        self.projects
            .iter()
            .filter(|p| p.kind == kind)
            .map(|p| p.allocated_hours)
            .sum()
    }
}

// ==========================================
// CapacityAllocator - 周产能分配引擎
// ==========================================
pub struct CapacityAllocator {
    // 无状态引擎，不需要注入依赖
}

impl CapacityAllocator {
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 计算开工周序号
    ///
    /// - 无开工日: 0
    /// - 有开工日: 预测起始周一到项目所在周周一的整周数 (向下取整), 最小为 0
    ///
    /// 返回值可能超过最后一个周桶, 此时项目不分配任何工时。
    pub fn start_index(&self, horizon_start: NaiveDate, project_start: Option<NaiveDate>) -> i64 {
        let Some(date) = project_start else {
            return 0;
        };

        let days = (week_start(date) - week_start(horizon_start)).num_days();
        days.div_euclid(DAYS_PER_WEEK).max(0)
    }

    /// 分配全部项目
    ///
    /// 规则:
    /// 1) 已签约列表先全部分配
    /// 2) 待定列表只使用剩余产能
    /// 3) 每个项目从开工周起逐周取 min(剩余产能, 剩余工时)
    ///
    /// # 参数
    /// - `buckets`: 周桶（会被修改）
    /// - `horizon_start`: 预测起点（任意日期, 按所在周周一计算）
    /// - `committed`: 已排序的已签约项目
    /// - `pending`: 已排序的待定项目
    #[instrument(skip(self, buckets, committed, pending), fields(
        weeks = buckets.len(),
        committed_count = committed.len(),
        pending_count = pending.len()
    ))]
    pub fn allocate(
        &self,
        buckets: &mut [WeekBucket],
        horizon_start: NaiveDate,
        committed: &[&ProjectDemand],
        pending: &[&ProjectDemand],
    ) -> AllocationReport {
        let mut report = AllocationReport::default();

        for project in committed {
            if let Some(outcome) =
                self.allocate_project(buckets, horizon_start, project, DemandKind::Committed)
            {
                report.projects.push(outcome);
            }
        }

        for project in pending {
            if let Some(outcome) =
                self.allocate_project(buckets, horizon_start, project, DemandKind::Pending)
            {
                report.projects.push(outcome);
            }
        }

        debug!(
            committed_allocated = report.allocated_hours(DemandKind::Committed),
            pending_allocated = report.allocated_hours(DemandKind::Pending),
            "周产能分配完成"
        );

        report
    }

    /// 分配单个项目
    ///
    /// # 返回
    /// - None: 项目无有效需求（已归档或剩余工时非正），未尝试分配
    /// - Some(ProjectAllocation): 分配结果（可能部分或完全未落位）
    pub fn allocate_project(
        &self,
        buckets: &mut [WeekBucket],
        horizon_start: NaiveDate,
        project: &ProjectDemand,
        kind: DemandKind,
    ) -> Option<ProjectAllocation> {
        if !project.has_demand() {
            return None;
        }

        let demand_hours = project.demand_hours();
        let start_index = self.start_index(horizon_start, project.start_date());
        let mut remaining = demand_hours;

        if let Ok(first) = usize::try_from(start_index) {
            for bucket in buckets.iter_mut().skip(first) {
                if remaining <= 0.0 {
                    break;
                }

                let available = bucket.available_hours();
                if available <= 0.0 {
                    continue;
                }

                let hours = available.min(remaining);
                if hours >= available {
                    // 恰好填满时直接对齐产能, 避免浮点累加误差越界
                    bucket.used_hours = bucket.capacity_hours;
                } else {
                    bucket.used_hours = (bucket.used_hours + hours).min(bucket.capacity_hours);
                }
                bucket.record_allocation(&project.id, &project.name, &project.status, kind, hours);
                remaining -= hours;
            }
        }

        let outcome = ProjectAllocation {
            project_id: project.id.clone(),
            kind,
            demand_hours,
            allocated_hours: demand_hours - remaining.max(0.0),
            start_index,
        };

        if outcome.unplaced_hours() > 0.0 {
            warn!(
                project_id = %project.id,
                kind = %kind,
                start_index = start_index,
                unplaced_hours = outcome.unplaced_hours(),
                "项目工时超出预测窗口, 未能全部落位"
            );
        }

        Some(outcome)
    }
}

// ==========================================
// Default trait 实现
// ==========================================
impl Default for CapacityAllocator {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 测试模块
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::bucket_builder::BucketBuilder;

    // ==========================================
    // 测试辅助函数
    // ==========================================

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// 2026-10-19 是周一
    fn horizon() -> NaiveDate {
        ymd(2026, 10, 19)
    }

    fn create_test_buckets(weeks: i32, capacity: f64) -> Vec<WeekBucket> {
        BucketBuilder::new().build(horizon(), weeks, capacity)
    }

    fn create_test_project(id: &str, hours: f64, start: Option<NaiveDate>) -> ProjectDemand {
        ProjectDemand {
            id: id.to_string(),
            name: format!("Project {}", id),
            status: "awarded".to_string(),
            archived: false,
            remaining_hours: hours,
            scheduled_start_date: start,
            projected_start_date: None,
            priority: None,
        }
    }

    // ==========================================
    // 开工周序号
    // ==========================================

    #[test]
    fn test_start_index_undated_is_zero() {
        assert_eq!(CapacityAllocator::new().start_index(horizon(), None), 0);
    }

    #[test]
    fn test_start_index_whole_weeks() {
        let allocator = CapacityAllocator::new();
        // 同一周内任意一天 => 0
        assert_eq!(allocator.start_index(horizon(), Some(ymd(2026, 10, 23))), 0);
        // 下周一 => 1
        assert_eq!(allocator.start_index(horizon(), Some(ymd(2026, 10, 26))), 1);
        // 三周后的周四 => 3
        assert_eq!(allocator.start_index(horizon(), Some(ymd(2026, 11, 12))), 3);
    }

    #[test]
    fn test_start_index_sunday_counts_as_previous_week() {
        // 2026-11-01 是周日, 属于 10-26 那一周 => 1
        assert_eq!(
            CapacityAllocator::new().start_index(horizon(), Some(ymd(2026, 11, 1))),
            1
        );
    }

    #[test]
    fn test_start_index_before_horizon_clamped() {
        assert_eq!(
            CapacityAllocator::new().start_index(horizon(), Some(ymd(2026, 6, 1))),
            0
        );
    }

    #[test]
    fn test_start_index_uses_horizon_week_monday() {
        // 预测起点为周三时，仍以所在周周一为 0 周
        assert_eq!(
            CapacityAllocator::new().start_index(ymd(2026, 10, 21), Some(ymd(2026, 10, 19))),
            0
        );
    }

    // ==========================================
    // 分配
    // ==========================================

    #[test]
    fn test_allocate_spills_across_weeks() {
        let allocator = CapacityAllocator::new();
        let mut buckets = create_test_buckets(3, 400.0);
        let p = create_test_project("P1", 1000.0, None);

        let report = allocator.allocate(&mut buckets, horizon(), &[&p], &[]);

        let used: Vec<f64> = buckets.iter().map(|b| b.used_hours).collect();
        assert_eq!(used, vec![400.0, 400.0, 200.0]);
        assert_eq!(report.projects.len(), 1);
        assert_eq!(report.projects[0].allocated_hours, 1000.0);
        assert_eq!(report.unplaced_hours(DemandKind::Committed), 0.0);
    }

    #[test]
    fn test_allocate_starts_at_start_index() {
        let allocator = CapacityAllocator::new();
        let mut buckets = create_test_buckets(4, 100.0);
        let p = create_test_project("P1", 150.0, Some(ymd(2026, 11, 4)));

        allocator.allocate(&mut buckets, horizon(), &[&p], &[]);

        let used: Vec<f64> = buckets.iter().map(|b| b.used_hours).collect();
        assert_eq!(used, vec![0.0, 0.0, 100.0, 50.0]);
    }

    #[test]
    fn test_start_beyond_horizon_receives_nothing() {
        let allocator = CapacityAllocator::new();
        let mut buckets = create_test_buckets(2, 100.0);
        let p = create_test_project("LATE", 80.0, Some(ymd(2027, 3, 1)));

        let report = allocator.allocate(&mut buckets, horizon(), &[&p], &[]);

        assert!(buckets.iter().all(|b| b.used_hours == 0.0 && b.allocations.is_empty()));
        assert_eq!(report.projects[0].allocated_hours, 0.0);
        assert_eq!(report.unplaced_hours(DemandKind::Committed), 80.0);
    }

    #[test]
    fn test_committed_before_pending() {
        let allocator = CapacityAllocator::new();
        let mut buckets = create_test_buckets(2, 100.0);
        let committed = create_test_project("C1", 150.0, None);
        let pending = create_test_project("B1", 100.0, None);

        allocator.allocate(&mut buckets, horizon(), &[&committed], &[&pending]);

        assert_eq!(buckets[0].allocations.len(), 1);
        assert_eq!(buckets[0].allocations[0].kind, DemandKind::Committed);
        assert_eq!(buckets[1].allocations.len(), 2);
        assert_eq!(buckets[1].allocations[0].hours, 50.0);
        assert_eq!(buckets[1].allocations[1].project_id, "B1");
        assert_eq!(buckets[1].allocations[1].kind, DemandKind::Pending);
        assert_eq!(buckets[1].allocations[1].hours, 50.0);
    }

    #[test]
    fn test_non_positive_hours_skipped() {
        let allocator = CapacityAllocator::new();
        let mut buckets = create_test_buckets(2, 100.0);
        let zero = create_test_project("Z", 0.0, None);
        let negative = create_test_project("N", -20.0, None);

        let report = allocator.allocate(&mut buckets, horizon(), &[&zero, &negative], &[]);

        assert!(report.projects.is_empty());
        assert!(buckets.iter().all(|b| b.used_hours == 0.0));
    }

    #[test]
    fn test_zero_capacity_allocates_nothing() {
        let allocator = CapacityAllocator::new();
        let mut buckets = create_test_buckets(3, 0.0);
        let p = create_test_project("P1", 10.0, None);

        let report = allocator.allocate(&mut buckets, horizon(), &[&p], &[]);

        assert!(buckets.iter().all(|b| b.allocations.is_empty()));
        assert_eq!(report.unplaced_hours(DemandKind::Committed), 10.0);
    }

    #[test]
    fn test_duplicate_project_entries_merge_within_bucket() {
        let allocator = CapacityAllocator::new();
        let mut buckets = create_test_buckets(1, 100.0);
        let first = create_test_project("P1", 30.0, None);
        let second = create_test_project("P1", 20.0, None);

        allocator.allocate(&mut buckets, horizon(), &[&first, &second], &[]);

        assert_eq!(buckets[0].allocations.len(), 1);
        assert_eq!(buckets[0].allocations[0].hours, 50.0);
        assert_eq!(buckets[0].used_hours, 50.0);
    }

    #[test]
    fn test_used_never_exceeds_capacity_with_fractional_hours() {
        let allocator = CapacityAllocator::new();
        let mut buckets = create_test_buckets(3, 100.0);
        let projects: Vec<ProjectDemand> = (0..40)
            .map(|i| create_test_project(&format!("P{}", i), 7.3 + (i as f64) * 0.1, None))
            .collect();
        let refs: Vec<&ProjectDemand> = projects.iter().collect();

        allocator.allocate(&mut buckets, horizon(), &refs, &[]);

        for b in &buckets {
            assert!(b.used_hours >= 0.0);
            assert!(b.used_hours <= b.capacity_hours, "week {} over capacity", b.week_index);
        }
    }
}
