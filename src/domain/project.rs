// ==========================================
// 钢结构车间产能预测 - 项目需求领域模型
// ==========================================
// 职责: 项目原始记录 (ProjectRecord) 与引擎输入 (ProjectDemand)
// 红线: 剩余工时的来源字段优先级只在 resolve_remaining_hours 中定义
// ==========================================

use crate::domain::types::DemandKind;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// ProjectDemand - 引擎输入
// ==========================================
// 一个项目的制作工时需求 (已由调用方解析出剩余工时)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDemand {
    pub id: String,                               // 项目ID (稳定唯一)
    pub name: String,                             // 项目名称 (仅展示 + 排序兜底)
    #[serde(default)]
    pub status: String,                           // 状态 (仅展示)
    #[serde(default)]
    pub archived: bool,                           // 已归档: 排序前整体剔除
    #[serde(default)]
    pub remaining_hours: f64,                     // 剩余制作工时
    #[serde(default)]
    pub scheduled_start_date: Option<NaiveDate>,  // 计划开工日 (优先)
    #[serde(default)]
    pub projected_start_date: Option<NaiveDate>,  // 预计开工日 (兜底)
    #[serde(default)]
    pub priority: Option<i32>,                    // 优先级 (越小越靠前)
}

impl ProjectDemand {
    /// 可解析的开工日: scheduled_start_date 优先, 否则 projected_start_date
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.scheduled_start_date.or(self.projected_start_date)
    }

    /// 是否参与分配 (未归档且剩余工时为正)
    pub fn has_demand(&self) -> bool {
        !self.archived && self.demand_hours() > 0.0
    }

    /// 有效需求工时 (非正数/非有限值视为 0)
    pub fn demand_hours(&self) -> f64 {
        if self.remaining_hours.is_finite() && self.remaining_hours > 0.0 {
            self.remaining_hours
        } else {
            0.0
        }
    }
}

// ==========================================
// 剩余工时解析
// ==========================================

/// 解析项目剩余工时
///
/// 优先级:
/// 1) remaining_hours (存在且为有限数值时直接采用, 包括 0)
/// 2) total_estimated_hours (同上)
/// 3) 0.0
///
/// NaN/无穷大视为字段缺失。
pub fn resolve_remaining_hours(
    remaining_hours: Option<f64>,
    total_estimated_hours: Option<f64>,
) -> f64 {
    remaining_hours
        .filter(|h| h.is_finite())
        .or_else(|| total_estimated_hours.filter(|h| h.is_finite()))
        .unwrap_or(0.0)
}

// ==========================================
// ProjectRecord - 项目原始记录
// ==========================================
// 用途: 仓储与导入层的持久化形态, 保留原始工时字段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    pub id: String,
    pub name: String,
    pub status: String,
    pub kind: DemandKind,                         // 已签约 / 待定
    pub archived: bool,
    pub remaining_hours: Option<f64>,             // 剩余工时 (可能缺失)
    pub total_estimated_hours: Option<f64>,       // 估算总工时 (可能缺失)
    pub scheduled_start_date: Option<NaiveDate>,
    pub projected_start_date: Option<NaiveDate>,
    pub priority: Option<i32>,
}

impl ProjectRecord {
    /// 转换为引擎输入
    pub fn to_demand(&self) -> ProjectDemand {
        ProjectDemand {
            id: self.id.clone(),
            name: self.name.clone(),
            status: self.status.clone(),
            archived: self.archived,
            remaining_hours: resolve_remaining_hours(
                self.remaining_hours,
                self.total_estimated_hours,
            ),
            scheduled_start_date: self.scheduled_start_date,
            projected_start_date: self.projected_start_date,
            priority: self.priority,
        }
    }
}
