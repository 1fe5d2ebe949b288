// ==========================================
// 钢结构车间产能预测 - 项目导入器
// ==========================================
// 流程: 文件解析 → 字段映射 → 落库 (单事务)
// 行级错误跳过并记录, 文件级错误整体失败
// ==========================================

use crate::domain::project::ProjectRecord;
use crate::domain::types::DemandKind;
use crate::importer::error::ImportResult;
use crate::importer::field_mapper::ProjectFieldMapper;
use crate::importer::file_parser::UniversalFileParser;
use crate::repository::ProjectRepository;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// 被跳过的行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedRow {
    pub row: usize,
    pub reason: String,
}

/// 解析结果 (未落库)
#[derive(Debug, Clone, Default)]
pub struct ImportOutcome {
    pub records: Vec<ProjectRecord>,
    pub skipped: Vec<SkippedRow>,
}

/// 导入报告
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub kind: DemandKind,
    pub imported: usize,
    pub skipped: Vec<SkippedRow>,
}

// ==========================================
// ProjectImporter
// ==========================================
pub struct ProjectImporter {
    file_parser: UniversalFileParser,
    field_mapper: ProjectFieldMapper,
    project_repo: Arc<ProjectRepository>,
}

impl ProjectImporter {
    pub fn new(project_repo: Arc<ProjectRepository>) -> Self {
        Self {
            file_parser: UniversalFileParser,
            field_mapper: ProjectFieldMapper,
            project_repo,
        }
    }

    /// 解析并映射文件 (不落库)
    pub fn parse_file<P: AsRef<Path>>(
        &self,
        file_path: P,
        kind: DemandKind,
    ) -> ImportResult<ImportOutcome> {
        let raw_rows = self.file_parser.parse(file_path.as_ref())?;
        debug!(total_rows = raw_rows.len(), "文件解析完成");

        let mut outcome = ImportOutcome::default();
        for raw in &raw_rows {
            let row_number = raw.row_number;
            match self.field_mapper.map_row(&raw.record, row_number, kind) {
                Ok(record) => outcome.records.push(record),
                Err(e) if e.is_row_error() => {
                    warn!(row_number, error = %e, "字段映射失败, 跳过该行");
                    outcome.skipped.push(SkippedRow {
                        row: row_number,
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        Ok(outcome)
    }

    /// 导入项目文件
    ///
    /// # 参数
    /// - file_path: .csv / .xlsx 文件路径
    /// - kind: 文件内项目的类别 (已签约 / 待定)
    ///
    /// # 返回
    /// 导入报告 (成功条数 + 跳过的行)
    #[instrument(skip(self, file_path, kind), fields(kind = %kind))]
    pub fn import_file<P: AsRef<Path>>(
        &self,
        file_path: P,
        kind: DemandKind,
    ) -> ImportResult<ImportReport> {
        let file_path = file_path.as_ref();
        info!(file_path = %file_path.display(), "开始导入项目数据");

        let outcome = self.parse_file(file_path, kind)?;
        let imported = self.project_repo.batch_upsert(&outcome.records)?;

        info!(
            imported,
            skipped = outcome.skipped.len(),
            "项目导入完成"
        );

        Ok(ImportReport {
            kind,
            imported,
            skipped: outcome.skipped,
        })
    }
}
