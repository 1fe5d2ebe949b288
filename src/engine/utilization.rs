// ==========================================
// 钢结构车间产能预测 - 利用率分析引擎
// ==========================================
// 职责: 只读扫描最终周桶, 输出汇总、缺口、超载、接单建议
// 输入: 分配完成的周桶 + 原始需求合计
// 输出: ForecastSummary
// ==========================================
// 说明: 分配阶段按剩余产能截断, 超载列表按构造应恒为空;
//       非空即表示分配不变量被破坏, 以 warn 日志上报
// ==========================================

use crate::domain::capacity::CapacityConstraint;
use crate::domain::forecast::{
    BookingRecommendation, ForecastGap, ForecastSummary, ScenarioEcho, WeekBucket,
};
use crate::domain::project::ProjectDemand;
use tracing::{debug, warn};

/// 每月周数（积压月数换算）
pub const WEEKS_PER_MONTH: f64 = 4.345;

/// 建议接单下限占可接工时的比例
pub const SUGGESTED_MIN_RATIO: f64 = 0.6;

/// 超载判定阈值（利用率）
pub const OVERLOAD_UTILIZATION: f64 = 1.0;

/// 原始需求合计（按提交的剩余工时，不是已分配量）
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DemandTotals {
    pub committed_hours: f64,
    pub pending_hours: f64,
}

impl DemandTotals {
    /// 汇总两个列表的有效需求（剔除已归档、非正工时）
    pub fn from_projects(committed: &[ProjectDemand], pending: &[ProjectDemand]) -> Self {
        let sum = |projects: &[ProjectDemand]| -> f64 {
            projects
                .iter()
                .filter(|p| !p.archived)
                .map(|p| p.demand_hours())
                .sum()
        };

        Self {
            committed_hours: sum(committed),
            pending_hours: sum(pending),
        }
    }

    pub fn total_hours(&self) -> f64 {
        self.committed_hours + self.pending_hours
    }
}

/// 积压月数 = 已签约工时 / (周产能 × 4.345)；周产能为 0 时返回 0
pub fn backlog_months(committed_hours: f64, weekly_capacity_hours: f64) -> f64 {
    if weekly_capacity_hours > 0.0 {
        committed_hours / (weekly_capacity_hours * WEEKS_PER_MONTH)
    } else {
        0.0
    }
}

// ==========================================
// UtilizationAnalyzer - 利用率分析引擎
// ==========================================
pub struct UtilizationAnalyzer {
    under_utilized_threshold: f64,
}

impl UtilizationAnalyzer {
    /// # 参数
    /// - `under_utilized_threshold`: 低利用率阈值（利用率低于该值的周记为缺口）
    pub fn new(under_utilized_threshold: f64) -> Self {
        Self {
            under_utilized_threshold,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.under_utilized_threshold
    }

    /// 生成预测汇总
    pub fn analyze(
        &self,
        buckets: Vec<WeekBucket>,
        totals: DemandTotals,
        weekly_capacity_hours: f64,
        scenario: ScenarioEcho,
    ) -> ForecastSummary {
        let mut gaps = Vec::new();
        let mut overloads = Vec::new();
        let mut recommendations = Vec::new();

        for bucket in &buckets {
            // 产能为 0 的周不参与缺口/超载扫描
            let Some(utilization) = bucket.utilization() else {
                continue;
            };

            if utilization < self.under_utilized_threshold {
                gaps.push(ForecastGap {
                    start_date: bucket.start_date,
                    end_date: bucket.end_date,
                    used_hours: bucket.used_hours,
                    capacity_hours: bucket.capacity_hours,
                    utilization,
                });
                recommendations.push(self.recommend(bucket));
            }

            if utilization > OVERLOAD_UTILIZATION {
                warn!(
                    week_index = bucket.week_index,
                    used_hours = bucket.used_hours,
                    capacity_hours = bucket.capacity_hours,
                    "周桶超载: 分配不变量被破坏"
                );
                overloads.push(bucket.clone());
            }
        }

        debug!(
            gaps = gaps.len(),
            overloads = overloads.len(),
            threshold = self.under_utilized_threshold,
            "利用率分析完成"
        );

        ForecastSummary {
            total_committed_hours: totals.committed_hours,
            total_pending_hours: totals.pending_hours,
            total_remaining_hours: totals.total_hours(),
            backlog_months: backlog_months(totals.committed_hours, weekly_capacity_hours),
            buckets,
            gaps,
            overloads,
            recommendations,
            scenario,
        }
    }

    /// 单个缺口周的接单建议
    fn recommend(&self, bucket: &WeekBucket) -> BookingRecommendation {
        let available_hours = bucket.available_hours();
        BookingRecommendation {
            week_index: bucket.week_index,
            start_date: bucket.start_date,
            end_date: bucket.end_date,
            available_hours,
            suggested_min_hours: SUGGESTED_MIN_RATIO * available_hours,
            suggested_max_hours: available_hours,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::bucket_builder::BucketBuilder;
    use chrono::NaiveDate;

    fn buckets_with_used(capacity: f64, used: &[f64]) -> Vec<WeekBucket> {
        let mut buckets = BucketBuilder::new().build(
            NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            used.len() as i32,
            capacity,
        );
        for (b, u) in buckets.iter_mut().zip(used) {
            b.used_hours = *u;
        }
        buckets
    }

    fn scenario(weeks: i32) -> ScenarioEcho {
        ScenarioEcho {
            shift_multiplier: 1.0,
            weeks,
        }
    }

    #[test]
    fn test_gap_and_recommendation() {
        let analyzer = UtilizationAnalyzer::new(0.70);
        let summary = analyzer.analyze(
            buckets_with_used(400.0, &[400.0, 280.0, 200.0]),
            DemandTotals {
                committed_hours: 880.0,
                pending_hours: 0.0,
            },
            400.0,
            scenario(3),
        );

        // 280/400 = 0.70 不低于阈值, 不是缺口
        assert_eq!(summary.gaps.len(), 1);
        assert_eq!(summary.gaps[0].utilization, 0.5);
        assert_eq!(summary.recommendations.len(), 1);
        let rec = &summary.recommendations[0];
        assert_eq!(rec.week_index, 2);
        assert_eq!(rec.available_hours, 200.0);
        assert_eq!(rec.suggested_min_hours, 120.0);
        assert_eq!(rec.suggested_max_hours, 200.0);
        assert!(summary.overloads.is_empty());
    }

    #[test]
    fn test_zero_capacity_excluded_from_scans() {
        let analyzer = UtilizationAnalyzer::new(0.70);
        let summary = analyzer.analyze(
            buckets_with_used(0.0, &[0.0, 0.0]),
            DemandTotals::default(),
            0.0,
            scenario(2),
        );

        assert!(summary.gaps.is_empty());
        assert!(summary.overloads.is_empty());
        assert_eq!(summary.backlog_months, 0.0);
    }

    #[test]
    fn test_overload_detected_when_invariant_broken() {
        let analyzer = UtilizationAnalyzer::new(0.70);
        let summary = analyzer.analyze(
            buckets_with_used(100.0, &[120.0]),
            DemandTotals::default(),
            100.0,
            scenario(1),
        );

        assert_eq!(summary.overloads.len(), 1);
        assert_eq!(summary.overloads[0].week_index, 0);
    }

    #[test]
    fn test_backlog_months() {
        assert!((backlog_months(1000.0, 400.0) - 1000.0 / 1738.0).abs() < 1e-12);
        assert_eq!(backlog_months(1000.0, 0.0), 0.0);
    }

    #[test]
    fn test_demand_totals_skip_archived_and_non_positive() {
        let mk = |id: &str, hours: f64, archived: bool| ProjectDemand {
            id: id.to_string(),
            name: id.to_string(),
            status: String::new(),
            archived,
            remaining_hours: hours,
            scheduled_start_date: None,
            projected_start_date: None,
            priority: None,
        };

        let totals = DemandTotals::from_projects(
            &[mk("A", 100.0, false), mk("B", -50.0, false), mk("C", 70.0, true)],
            &[mk("D", 30.0, false)],
        );

        assert_eq!(totals.committed_hours, 100.0);
        assert_eq!(totals.pending_hours, 30.0);
        assert_eq!(totals.total_hours(), 130.0);
    }
}
