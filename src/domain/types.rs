// ==========================================
// 钢结构车间产能预测 - 领域类型定义
// ==========================================
// 职责: 需求类别等跨模块共享的枚举
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 需求类别 (Demand Kind)
// ==========================================
// committed: 已签约项目,优先占用产能
// pending:   投标/意向项目,只能占用剩余产能
// 序列化格式: lowercase (与 JSON 输出、数据库一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DemandKind {
    Committed, // 已签约
    Pending,   // 待定
}

impl DemandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DemandKind::Committed => "committed",
            DemandKind::Pending => "pending",
        }
    }
}

impl fmt::Display for DemandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DemandKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "committed" | "commit" | "awarded" => Ok(DemandKind::Committed),
            "pending" | "pipeline" | "bid" => Ok(DemandKind::Pending),
            other => Err(format!("未知需求类别: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demand_kind_from_str_accepts_aliases() {
        assert_eq!("Committed".parse::<DemandKind>(), Ok(DemandKind::Committed));
        assert_eq!(" pipeline ".parse::<DemandKind>(), Ok(DemandKind::Pending));
        assert!("archived".parse::<DemandKind>().is_err());
    }

    #[test]
    fn test_demand_kind_serializes_lowercase() {
        let json = serde_json::to_string(&DemandKind::Pending).unwrap();
        assert_eq!(json, "\"pending\"");
    }
}
