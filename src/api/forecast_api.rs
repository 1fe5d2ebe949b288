// ==========================================
// 钢结构车间产能预测 - 预测 API
// ==========================================
// 职责: 校验请求 → 读取项目与公司配置 → 调用预测引擎
// 架构: API 层 → Repository / Config → Engine (纯计算)
// ==========================================

use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::{Local, NaiveDate};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{
    validate_forecast_request, validate_resolved_settings, validate_shift_multiplier,
    ForecastRequest,
};
use crate::config::{CompanySettings, CompanySettingsProvider, ConfigManager};
use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::forecast::{ForecastOptions, ForecastSummary};
use crate::domain::project::ProjectDemand;
use crate::domain::types::DemandKind;
use crate::engine::{DemandTotals, ForecastEngine};
use crate::importer::{ImportReport, ProjectImporter};
use crate::repository::ProjectRepository;

// ==========================================
// 响应类型
// ==========================================

/// 窗口内未能排入的工时（需求合计 - 已分配合计）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnscheduledHours {
    pub committed: f64,
    pub pending: f64,
    pub total: f64,
}

/// 预测响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastResponse {
    pub summary: ForecastSummary,
    pub unscheduled_hours: UnscheduledHours,
}

/// 计算窗口外被截断的工时
///
/// 引擎静默截断超出窗口的需求, 调用方通过此值向用户展示。
pub fn unscheduled_hours(
    summary: &ForecastSummary,
    projects: &[ProjectDemand],
    pending_projects: &[ProjectDemand],
) -> UnscheduledHours {
    let totals = DemandTotals::from_projects(projects, pending_projects);
    let committed =
        (totals.committed_hours - summary.allocated_hours_for_kind(DemandKind::Committed)).max(0.0);
    let pending =
        (totals.pending_hours - summary.allocated_hours_for_kind(DemandKind::Pending)).max(0.0);

    UnscheduledHours {
        committed,
        pending,
        total: committed + pending,
    }
}

// 一次预测所需的全部输入（情景对比时在任务间共享）
struct ForecastInputs {
    committed: Vec<ProjectDemand>,
    pending: Vec<ProjectDemand>,
    settings: CompanySettings,
}

fn run_scenario(inputs: &ForecastInputs, request: &ForecastRequest, today: NaiveDate) -> ForecastResponse {
    let options = ForecastOptions {
        shift_multiplier: request
            .shift_multiplier
            .unwrap_or_else(|| ForecastOptions::default().shift_multiplier),
        weeks: request.weeks,
        start_date: request.start_date,
    };

    let run = ForecastEngine::new().run(
        &inputs.committed,
        &inputs.pending,
        &inputs.settings,
        Some(&options),
        request.threshold,
        today,
    );
    let unscheduled = unscheduled_hours(&run.summary, &inputs.committed, &inputs.pending);

    ForecastResponse {
        summary: run.summary,
        unscheduled_hours: unscheduled,
    }
}

// ==========================================
// ForecastApi - 预测 API
// ==========================================

/// 预测API
///
/// 职责：
/// 1. 请求校验（周数、班次倍率、阈值）
/// 2. 读取未归档的已签约 / 待定项目与公司配置
/// 3. 单次预测与多情景并行对比
/// 4. 项目清单导入
pub struct ForecastApi {
    project_repo: Arc<ProjectRepository>,
    settings_provider: Arc<dyn CompanySettingsProvider>,
    importer: ProjectImporter,
}

impl ForecastApi {
    /// 创建新的ForecastApi实例
    ///
    /// # 参数
    /// - project_repo: 项目仓储
    /// - settings_provider: 公司配置读取器
    pub fn new(
        project_repo: Arc<ProjectRepository>,
        settings_provider: Arc<dyn CompanySettingsProvider>,
    ) -> Self {
        Self {
            importer: ProjectImporter::new(project_repo.clone()),
            project_repo,
            settings_provider,
        }
    }

    /// 打开数据库（必要时建表）并装配仓储与配置管理器
    pub fn open(db_path: &str) -> ApiResult<(Self, Arc<ConfigManager>)> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;
        init_schema(&conn).map_err(|e| ApiError::DatabaseError(format!("建表失败: {}", e)))?;

        let conn = Arc::new(Mutex::new(conn));
        let project_repo = Arc::new(ProjectRepository::from_connection(conn.clone()));
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn).map_err(|e| ApiError::ConfigError(e.to_string()))?,
        );

        Ok((Self::new(project_repo, config_manager.clone()), config_manager))
    }

    pub fn project_repo(&self) -> &Arc<ProjectRepository> {
        &self.project_repo
    }

    async fn load_inputs(&self) -> ApiResult<ForecastInputs> {
        let settings = self
            .settings_provider
            .load_settings()
            .await
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;

        Ok(ForecastInputs {
            committed: self.project_repo.list_active_demands(DemandKind::Committed)?,
            pending: self.project_repo.list_active_demands(DemandKind::Pending)?,
            settings,
        })
    }

    /// 构建产能预测
    ///
    /// # 参数
    /// - request: 情景参数（缺省项取公司配置）
    ///
    /// # 返回
    /// - Ok(ForecastResponse): 预测汇总 + 窗口外工时
    /// - Err(ApiError::InvalidInput): 请求参数越界
    /// - Err(ApiError::ConfigError): 回落到的公司配置越界
    #[instrument(skip(self))]
    pub async fn build_forecast(&self, request: &ForecastRequest) -> ApiResult<ForecastResponse> {
        validate_forecast_request(request)?;

        let inputs = self.load_inputs().await?;
        validate_resolved_settings(request, &inputs.settings)?;
        let today = Local::now().date_naive();
        Ok(run_scenario(&inputs, request, today))
    }

    /// 多情景对比（按班次倍率）
    ///
    /// 每个倍率独立构建周桶并行计算, 结果顺序与 multipliers 一致。
    #[instrument(skip(self, base_request), fields(scenarios = multipliers.len()))]
    pub async fn compare_scenarios(
        &self,
        base_request: &ForecastRequest,
        multipliers: &[f64],
    ) -> ApiResult<Vec<ForecastResponse>> {
        validate_forecast_request(base_request)?;
        for &multiplier in multipliers {
            validate_shift_multiplier(multiplier)?;
        }

        let inputs = self.load_inputs().await?;
        validate_resolved_settings(base_request, &inputs.settings)?;
        let inputs = Arc::new(inputs);
        // 所有情景共用同一个起点
        let today = Local::now().date_naive();

        let tasks = multipliers.iter().map(|&multiplier| {
            let inputs = inputs.clone();
            let request = ForecastRequest {
                shift_multiplier: Some(multiplier),
                ..base_request.clone()
            };
            tokio::task::spawn_blocking(move || run_scenario(&inputs, &request, today))
        });

        let results = join_all(tasks)
            .await
            .into_iter()
            .map(|r| r.map_err(|e| ApiError::InternalError(format!("情景计算任务失败: {}", e))))
            .collect::<ApiResult<Vec<_>>>()?;

        info!(scenarios = results.len(), "情景对比完成");
        Ok(results)
    }

    /// 导入项目清单并落库
    ///
    /// # 参数
    /// - file_path: .csv / .xlsx 文件
    /// - kind: 已签约 / 待定
    pub fn import_projects<P: AsRef<Path>>(
        &self,
        file_path: P,
        kind: DemandKind,
    ) -> ApiResult<ImportReport> {
        Ok(self.importer.import_file(file_path, kind)?)
    }
}
