// ==========================================
// 钢结构车间产能预测 - 预测结果领域模型
// ==========================================
// 职责: 周桶 (WeekBucket)、分配记录、缺口、建议、预测汇总
// 生命周期: 每次预测调用时新建,不落库
// 序列化: camelCase, 日期 ISO-8601
// ==========================================

use crate::domain::types::DemandKind;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// ForecastOptions - 情景参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastOptions {
    #[serde(default = "default_shift_multiplier")]
    pub shift_multiplier: f64,          // 班次倍数 (加班/加班次)
    #[serde(default)]
    pub weeks: Option<i32>,             // 预测周数 (缺省取公司配置)
    #[serde(default)]
    pub start_date: Option<NaiveDate>,  // 预测起点 (缺省为今天, 对齐到周一)
}

fn default_shift_multiplier() -> f64 {
    1.0
}

impl Default for ForecastOptions {
    fn default() -> Self {
        Self {
            shift_multiplier: default_shift_multiplier(),
            weeks: None,
            start_date: None,
        }
    }
}

// ==========================================
// BucketAllocation - 周内分配记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketAllocation {
    pub project_id: String,
    pub name: String,
    pub hours: f64,
    pub status: String,
    pub kind: DemandKind,
}

// ==========================================
// WeekBucket - 预测周
// ==========================================
// 不变量: 0 <= used_hours <= capacity_hours
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekBucket {
    pub week_index: usize,                  // 周序号 (0 起, 连续)
    pub start_date: NaiveDateTime,          // 周一 00:00:00
    pub end_date: NaiveDateTime,            // 周日 23:59:59
    pub capacity_hours: f64,                // 周产能 (本次预测内恒定)
    pub used_hours: f64,                    // 已分配工时
    pub allocations: Vec<BucketAllocation>, // 分配明细 (按分配顺序)
}

impl WeekBucket {
    /// 记录一次分配 (同一项目同一类别在本周内合并为一条)
    pub fn record_allocation(
        &mut self,
        project_id: &str,
        name: &str,
        status: &str,
        kind: DemandKind,
        hours: f64,
    ) {
        if let Some(existing) = self
            .allocations
            .iter_mut()
            .find(|a| a.project_id == project_id && a.kind == kind)
        {
            existing.hours += hours;
            return;
        }

        self.allocations.push(BucketAllocation {
            project_id: project_id.to_string(),
            name: name.to_string(),
            hours,
            status: status.to_string(),
            kind,
        });
    }

    /// 某一类别在本周的分配合计
    pub fn hours_for_kind(&self, kind: DemandKind) -> f64 {
        self.allocations
            .iter()
            .filter(|a| a.kind == kind)
            .map(|a| a.hours)
            .sum()
    }
}

// ==========================================
// ForecastGap - 低利用率周
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastGap {
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub used_hours: f64,
    pub capacity_hours: f64,
    pub utilization: f64,
}

// ==========================================
// BookingRecommendation - 接单建议
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecommendation {
    pub week_index: usize,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub available_hours: f64,       // 可接工时 = 产能 - 已用
    pub suggested_min_hours: f64,   // 建议下限
    pub suggested_max_hours: f64,   // 建议上限
}

// ==========================================
// ScenarioEcho - 情景回显
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioEcho {
    pub shift_multiplier: f64,
    pub weeks: i32,
}

// ==========================================
// ForecastSummary - 预测汇总 (引擎输出)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastSummary {
    pub total_committed_hours: f64,   // 已签约需求合计 (按原始需求, 非已分配)
    pub total_pending_hours: f64,     // 待定需求合计
    pub total_remaining_hours: f64,   // 两者之和
    pub backlog_months: f64,          // 已签约积压 (月)
    pub buckets: Vec<WeekBucket>,
    pub gaps: Vec<ForecastGap>,
    pub overloads: Vec<WeekBucket>,
    pub recommendations: Vec<BookingRecommendation>,
    pub scenario: ScenarioEcho,
}

impl ForecastSummary {
    /// 所有周已分配工时合计
    pub fn total_allocated_hours(&self) -> f64 {
        self.buckets.iter().map(|b| b.used_hours).sum()
    }

    /// 某一类别在全部周内的分配合计
    pub fn allocated_hours_for_kind(&self, kind: DemandKind) -> f64 {
        self.buckets.iter().map(|b| b.hours_for_kind(kind)).sum()
    }
}
