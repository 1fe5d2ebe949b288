// ==========================================
// 钢结构车间产能预测 - 周产能约束
// ==========================================
// 红线: 已签约需求优先占用产能, 单周分配不超过周产能
// 用途: Allocator 分配检查 / Utilization Analyzer 利用率计算
// ==========================================

use crate::domain::forecast::WeekBucket;

// ==========================================
// Trait: CapacityConstraint
// ==========================================
pub trait CapacityConstraint {
    /// 剩余可分配工时 (可能为负, 表示超载)
    fn available_hours(&self) -> f64;

    /// 是否还能分配
    fn can_allocate(&self) -> bool;

    /// 利用率 = 已用 / 产能; 产能为 0 时无定义
    fn utilization(&self) -> Option<f64>;

    /// 是否超载 (利用率 > 1.0)
    fn is_overload(&self) -> bool;
}

// ==========================================
// CapacityConstraint trait 实现
// ==========================================
impl CapacityConstraint for WeekBucket {
    fn available_hours(&self) -> f64 {
        self.capacity_hours - self.used_hours
    }

    fn can_allocate(&self) -> bool {
        self.available_hours() > 0.0
    }

    /// # 返回
    /// - Some(ratio): capacity_hours > 0
    /// - None: capacity_hours == 0 (不参与缺口/超载扫描)
    fn utilization(&self) -> Option<f64> {
        if self.capacity_hours > 0.0 {
            Some(self.used_hours / self.capacity_hours)
        } else {
            None
        }
    }

    fn is_overload(&self) -> bool {
        self.utilization().map(|u| u > 1.0).unwrap_or(false)
    }
}
