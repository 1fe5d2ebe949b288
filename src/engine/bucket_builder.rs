// ==========================================
// 钢结构车间产能预测 - 周桶构建器
// ==========================================
// 职责: 由起始日期 + 周数生成连续、不重叠的周桶
// 输入: start_date, weeks, 基础周产能, 班次倍数
// 输出: Vec<WeekBucket> (week_index 0..weeks-1)
// ==========================================
// 周起点: ISO 周一; 周日归属上一周
// ==========================================

use crate::domain::forecast::WeekBucket;
use chrono::{Datelike, Days, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::debug;

/// 每周天数
pub const DAYS_PER_WEEK: i64 = 7;

/// 日期所在周的周一
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_monday() as u64;
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}

/// 本次预测的周产能 = max(0, 基础周产能 × 班次倍数)
///
/// 非有限值（NaN/无穷）视为 0。
pub fn effective_weekly_capacity(base_weekly_capacity_hours: f64, shift_multiplier: f64) -> f64 {
    let capacity = base_weekly_capacity_hours * shift_multiplier;
    if capacity.is_finite() {
        capacity.max(0.0)
    } else {
        0.0
    }
}

/// 周一所在周的起止时刻: (周一 00:00:00, 周日 23:59:59)
fn week_bounds(monday: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let start = monday.and_time(NaiveTime::MIN);
    let end = start + Duration::days(DAYS_PER_WEEK) - Duration::seconds(1);
    (start, end)
}

// ==========================================
// BucketBuilder - 周桶构建器
// ==========================================
pub struct BucketBuilder {
    // 无状态引擎，不需要注入依赖
}

impl BucketBuilder {
    pub fn new() -> Self {
        Self {}
    }

    /// 生成周桶
    ///
    /// # 参数
    /// - `start_date`: 预测起点（任意日期，自动对齐到所在周周一）
    /// - `weeks`: 周数（<= 0 时返回空列表）
    /// - `weekly_capacity_hours`: 每周产能（已乘班次倍数）
    ///
    /// # 返回
    /// 按 week_index 升序的周桶列表
    pub fn build(
        &self,
        start_date: NaiveDate,
        weeks: i32,
        weekly_capacity_hours: f64,
    ) -> Vec<WeekBucket> {
        if weeks <= 0 {
            return Vec::new();
        }

        let anchor = week_start(start_date);
        let capacity_hours = effective_weekly_capacity(weekly_capacity_hours, 1.0);

        let mut buckets = Vec::with_capacity(weeks as usize);
        for week_index in 0..weeks as usize {
            let monday = match anchor.checked_add_days(Days::new(week_index as u64 * DAYS_PER_WEEK as u64)) {
                Some(d) => d,
                None => break,
            };
            let (start, end) = week_bounds(monday);

            buckets.push(WeekBucket {
                week_index,
                start_date: start,
                end_date: end,
                capacity_hours,
                used_hours: 0.0,
                allocations: Vec::new(),
            });
        }

        debug!(
            anchor = %anchor,
            weeks = buckets.len(),
            capacity_hours = capacity_hours,
            "周桶构建完成"
        );

        buckets
    }
}

impl Default for BucketBuilder {
    fn default() -> Self {
        Self::new()
    }
}
