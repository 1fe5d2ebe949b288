// ==========================================
// 钢结构车间产能预测 - 字段映射器实现
// ==========================================
// 职责: 源表头 → 标准字段映射 + 类型转换
// 表头匹配: 忽略大小写、空格、下划线、连字符
// ==========================================

use crate::domain::project::ProjectRecord;
use crate::domain::types::DemandKind;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::RawRecord;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use uuid::Uuid;

// Excel 日期序列号的取值范围 (1900-01-01 .. 9999-12-31)
const EXCEL_SERIAL_MIN: f64 = 1.0;
const EXCEL_SERIAL_MAX: f64 = 2_958_465.0;

/// 标准字段及其可接受的表头别名（已归一化）
fn aliases(field: &str) -> &'static [&'static str] {
    match field {
        "id" => &["id", "projectid", "jobid", "jobnumber", "jobno", "项目id", "项目编号"],
        "name" => &["name", "projectname", "jobname", "项目名称"],
        "status" => &["status", "projectstatus", "状态"],
        "remaining_hours" => &["remaininghours", "remainingfabhours", "hoursremaining", "剩余工时"],
        "total_estimated_hours" => &[
            "totalestimatedhours",
            "estimatedhours",
            "fabhours",
            "totalhours",
            "估算工时",
        ],
        "scheduled_start_date" => &["scheduledstartdate", "scheduledstart", "startdate", "计划开工日"],
        "projected_start_date" => &[
            "projectedstartdate",
            "projectedstart",
            "expectedstartdate",
            "预计开工日",
        ],
        "priority" => &["priority", "rank", "优先级"],
        "archived" => &["archived", "isarchived", "归档"],
        _ => &[],
    }
}

/// 表头归一化: 小写 + 去除空格/下划线/连字符
pub fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

pub struct ProjectFieldMapper;

impl ProjectFieldMapper {
    /// 映射一行原始数据为项目记录
    ///
    /// # 参数
    /// - row: 原始行 (表头 → 文本)
    /// - row_number: 源文件中的行号 (用于错误定位)
    /// - kind: 本次导入的项目类别
    pub fn map_row(
        &self,
        row: &RawRecord,
        row_number: usize,
        kind: DemandKind,
    ) -> ImportResult<ProjectRecord> {
        let row: HashMap<String, &str> = row
            .iter()
            .map(|(k, v)| (normalize_header(k), v.trim()))
            .collect();

        let name = self
            .get_string(&row, "name")
            .ok_or_else(|| ImportError::RequiredFieldMissing {
                row: row_number,
                field: "name".to_string(),
            })?;

        Ok(ProjectRecord {
            // 主键缺失时生成
            id: self
                .get_string(&row, "id")
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            name,
            status: self.get_string(&row, "status").unwrap_or_default(),
            kind,
            archived: self.parse_bool(&row, "archived", row_number)?.unwrap_or(false),

            // 工时
            remaining_hours: self.parse_f64(&row, "remaining_hours", row_number)?,
            total_estimated_hours: self.parse_f64(&row, "total_estimated_hours", row_number)?,

            // 日期
            scheduled_start_date: self.parse_date(&row, "scheduled_start_date", row_number)?,
            projected_start_date: self.parse_date(&row, "projected_start_date", row_number)?,

            priority: self.parse_i32(&row, "priority", row_number)?,
        })
    }

    /// 按别名提取字符串字段（空串视为缺失）
    fn get_string(&self, row: &HashMap<String, &str>, field: &str) -> Option<String> {
        aliases(field)
            .iter()
            .filter_map(|alias| row.get(*alias))
            .find(|v| !v.is_empty())
            .map(|v| v.to_string())
    }

    /// 解析浮点数（允许千分位逗号）
    fn parse_f64(
        &self,
        row: &HashMap<String, &str>,
        field: &str,
        row_number: usize,
    ) -> ImportResult<Option<f64>> {
        match self.get_string(row, field) {
            None => Ok(None),
            Some(value) => value
                .replace(',', "")
                .parse::<f64>()
                .map(Some)
                .map_err(|_| ImportError::TypeConversionError {
                    row: row_number,
                    field: field.to_string(),
                    message: format!("无法解析为浮点数: {}", value),
                }),
        }
    }

    /// 解析整数（Excel 数值单元格会带 ".0"，按整数值接受）
    fn parse_i32(
        &self,
        row: &HashMap<String, &str>,
        field: &str,
        row_number: usize,
    ) -> ImportResult<Option<i32>> {
        match self.get_string(row, field) {
            None => Ok(None),
            Some(value) => {
                if let Ok(v) = value.parse::<i32>() {
                    return Ok(Some(v));
                }
                match value.parse::<f64>() {
                    Ok(f) if f.fract() == 0.0 && f.abs() <= i32::MAX as f64 => Ok(Some(f as i32)),
                    _ => Err(ImportError::TypeConversionError {
                        row: row_number,
                        field: field.to_string(),
                        message: format!("无法解析为整数: {}", value),
                    }),
                }
            }
        }
    }

    /// 解析布尔值
    fn parse_bool(
        &self,
        row: &HashMap<String, &str>,
        field: &str,
        row_number: usize,
    ) -> ImportResult<Option<bool>> {
        match self.get_string(row, field) {
            None => Ok(None),
            Some(value) => match value.to_lowercase().as_str() {
                "true" | "yes" | "y" | "1" | "是" => Ok(Some(true)),
                "false" | "no" | "n" | "0" | "否" => Ok(Some(false)),
                _ => Err(ImportError::TypeConversionError {
                    row: row_number,
                    field: field.to_string(),
                    message: format!("无法解析为布尔值: {}", value),
                }),
            },
        }
    }

    /// 解析日期
    ///
    /// 支持: YYYY-MM-DD / YYYYMMDD / YYYY/MM/DD / 带时间的 ISO 格式 / Excel 日期序列号
    fn parse_date(
        &self,
        row: &HashMap<String, &str>,
        field: &str,
        row_number: usize,
    ) -> ImportResult<Option<NaiveDate>> {
        match self.get_string(row, field) {
            None => Ok(None),
            Some(value) => parse_date_text(&value)
                .map(Some)
                .ok_or_else(|| ImportError::DateFormatError {
                    row: row_number,
                    field: field.to_string(),
                    value,
                }),
        }
    }
}

/// 解析日期文本，失败返回 None
pub fn parse_date_text(value: &str) -> Option<NaiveDate> {
    let value = value.trim();

    for fmt in ["%Y-%m-%d", "%Y%m%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
            return Some(date);
        }
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt.date());
        }
    }

    // Excel 日期序列号 (以 1899-12-30 为 0)
    let serial = value.parse::<f64>().ok()?;
    if !(EXCEL_SERIAL_MIN..=EXCEL_SERIAL_MAX).contains(&serial) {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_signed(Duration::days(serial.floor() as i64))
}
