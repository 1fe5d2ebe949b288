// ==========================================
// 钢结构车间产能预测 - 预测编排器
// ==========================================
// 用途: 协调三个核心引擎的执行顺序
// 流程: BucketBuilder → ProjectSorter + CapacityAllocator → UtilizationAnalyzer
// ==========================================
// 纯计算: 无 I/O, 无共享可变状态; 相同输入产生相同输出
// ==========================================

use crate::config::CompanySettings;
use crate::domain::forecast::{ForecastOptions, ForecastSummary, ScenarioEcho};
use crate::domain::project::ProjectDemand;
use crate::domain::types::DemandKind;
use crate::engine::allocator::{AllocationReport, CapacityAllocator};
use crate::engine::bucket_builder::{effective_weekly_capacity, week_start, BucketBuilder};
use crate::engine::priority::ProjectSorter;
use crate::engine::utilization::{DemandTotals, UtilizationAnalyzer};
use chrono::{Local, NaiveDate};
use tracing::{debug, info, instrument};

/// 预测输出 + 分配报告（用于统计超出窗口的工时）
#[derive(Debug, Clone)]
pub struct ForecastRun {
    pub summary: ForecastSummary,
    pub allocation: AllocationReport,
}

// ==========================================
// ForecastEngine - 预测编排器
// ==========================================
pub struct ForecastEngine {
    builder: BucketBuilder,
    sorter: ProjectSorter,
    allocator: CapacityAllocator,
}

impl ForecastEngine {
    pub fn new() -> Self {
        Self {
            builder: BucketBuilder::new(),
            sorter: ProjectSorter::new(),
            allocator: CapacityAllocator::new(),
        }
    }

    /// 执行一次完整预测
    ///
    /// # 参数
    /// - `projects`: 已签约项目
    /// - `pending_projects`: 待定项目
    /// - `settings`: 公司配置（周产能 / 默认周数 / 低利用率阈值）
    /// - `options`: 情景参数（缺省: 班次 1.0, 周数取配置, 起点为 `today`）
    /// - `threshold`: 低利用率阈值覆写（缺省取配置）
    /// - `today`: 当前日期（options.start_date 缺失时的起点）
    #[instrument(skip_all, fields(
        committed_count = projects.len(),
        pending_count = pending_projects.len()
    ))]
    pub fn run(
        &self,
        projects: &[ProjectDemand],
        pending_projects: &[ProjectDemand],
        settings: &CompanySettings,
        options: Option<&ForecastOptions>,
        threshold: Option<f64>,
        today: NaiveDate,
    ) -> ForecastRun {
        let defaults = ForecastOptions::default();
        let options = options.unwrap_or(&defaults);

        let weeks = options.weeks.unwrap_or_else(|| settings.forecast_weeks());
        let start_date = week_start(options.start_date.unwrap_or(today));
        let weekly_capacity =
            effective_weekly_capacity(settings.base_weekly_capacity(), options.shift_multiplier);
        let threshold = threshold.unwrap_or_else(|| settings.under_utilized_threshold());

        info!(
            start_date = %start_date,
            weeks = weeks,
            shift_multiplier = options.shift_multiplier,
            weekly_capacity = weekly_capacity,
            threshold = threshold,
            "开始产能预测"
        );

        // ==========================================
        // 步骤1: 构建周桶
        // ==========================================
        let mut buckets = self.builder.build(start_date, weeks, weekly_capacity);

        // ==========================================
        // 步骤2: 排序 + 分配（已签约优先）
        // ==========================================
        let committed = self.sorter.sort(projects, DemandKind::Committed);
        let pending = self.sorter.sort(pending_projects, DemandKind::Pending);
        debug!(
            committed_active = committed.len(),
            pending_active = pending.len(),
            "项目排序完成"
        );

        let allocation = self
            .allocator
            .allocate(&mut buckets, start_date, &committed, &pending);

        // ==========================================
        // 步骤3: 利用率分析
        // ==========================================
        let totals = DemandTotals::from_projects(projects, pending_projects);
        let scenario = ScenarioEcho {
            shift_multiplier: options.shift_multiplier,
            weeks,
        };
        let summary = UtilizationAnalyzer::new(threshold).analyze(
            buckets,
            totals,
            weekly_capacity,
            scenario,
        );

        info!(
            total_committed_hours = summary.total_committed_hours,
            total_pending_hours = summary.total_pending_hours,
            backlog_months = summary.backlog_months,
            gaps = summary.gaps.len(),
            "产能预测完成"
        );

        ForecastRun {
            summary,
            allocation,
        }
    }
}

impl Default for ForecastEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// 构建产能预测（起点缺省为本地今天）
///
/// 相同的项目列表 / 配置 / 情景 (含 start_date) 产生结构相同的结果。
pub fn build_forecast(
    projects: &[ProjectDemand],
    pending_projects: &[ProjectDemand],
    settings: &CompanySettings,
    options: Option<&ForecastOptions>,
    threshold: Option<f64>,
) -> ForecastSummary {
    let today = Local::now().date_naive();
    ForecastEngine::new()
        .run(projects, pending_projects, settings, options, threshold, today)
        .summary
}
