// ==========================================
// 钢结构车间产能预测 - 导入层
// ==========================================
// 职责: 外部项目清单导入, 生成项目记录
// 支持: Excel (.xlsx), CSV
// ==========================================

// 模块声明
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod project_importer;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use field_mapper::ProjectFieldMapper;
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawRecord, RawRow, UniversalFileParser};
pub use project_importer::{ImportOutcome, ImportReport, ProjectImporter, SkippedRow};
