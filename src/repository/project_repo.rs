// ==========================================
// 钢结构车间产能预测 - 项目数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑（剩余工时解析交给领域层）
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::project::{ProjectDemand, ProjectRecord};
use crate::domain::types::DemandKind;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const DATE_FORMAT: &str = "%Y-%m-%d";

const SELECT_COLUMNS: &str = r#"
    SELECT
        project_id, name, status, kind, archived,
        remaining_hours, total_estimated_hours,
        scheduled_start_date, projected_start_date, priority
    FROM project
"#;

// ==========================================
// ProjectRepository - 项目仓储
// ==========================================

/// 项目仓储
/// 职责: 管理 project 表的 CRUD 操作
pub struct ProjectRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProjectRepository {
    /// 创建新的项目仓储实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入或更新单个项目（按 project_id）
    pub fn upsert(&self, record: &ProjectRecord) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        upsert_with(&conn, record)?;
        Ok(())
    }

    /// 批量插入或更新（单事务）
    ///
    /// # 返回
    /// 写入的记录数
    pub fn batch_upsert(&self, records: &[ProjectRecord]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        for record in records {
            upsert_with(&tx, record)?;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(records.len())
    }

    /// 按 ID 查询项目
    pub fn find_by_id(&self, project_id: &str) -> RepositoryResult<Option<ProjectRecord>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE project_id = ?1", SELECT_COLUMNS);

        let record = conn
            .query_row(&sql, params![project_id], map_project_row)
            .optional()?;

        Ok(record)
    }

    /// 查询未归档项目（按写入顺序）
    pub fn list_active(&self, kind: DemandKind) -> RepositoryResult<Vec<ProjectRecord>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE kind = ?1 AND archived = 0 ORDER BY rowid", SELECT_COLUMNS);

        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(params![kind.as_str()], map_project_row)?
            .collect::<rusqlite::Result<Vec<ProjectRecord>>>()?;

        Ok(records)
    }

    /// 查询未归档项目并转换为引擎输入
    pub fn list_active_demands(&self, kind: DemandKind) -> RepositoryResult<Vec<ProjectDemand>> {
        Ok(self
            .list_active(kind)?
            .iter()
            .map(ProjectRecord::to_demand)
            .collect())
    }

    /// 设置归档标志
    pub fn set_archived(&self, project_id: &str, archived: bool) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE project SET archived = ?1, updated_at = datetime('now') WHERE project_id = ?2",
            params![archived, project_id],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "project".to_string(),
                id: project_id.to_string(),
            });
        }
        Ok(())
    }

    /// 删除项目
    ///
    /// # 返回
    /// - true: 已删除
    /// - false: 记录不存在
    pub fn delete(&self, project_id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM project WHERE project_id = ?1", params![project_id])?;
        Ok(affected > 0)
    }
}

// ==========================================
// 行映射
// ==========================================

fn upsert_with(conn: &Connection, record: &ProjectRecord) -> rusqlite::Result<usize> {
    conn.execute(
        r#"
        INSERT INTO project (
            project_id, name, status, kind, archived,
            remaining_hours, total_estimated_hours,
            scheduled_start_date, projected_start_date, priority, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, datetime('now'))
        ON CONFLICT(project_id) DO UPDATE SET
            name = excluded.name,
            status = excluded.status,
            kind = excluded.kind,
            archived = excluded.archived,
            remaining_hours = excluded.remaining_hours,
            total_estimated_hours = excluded.total_estimated_hours,
            scheduled_start_date = excluded.scheduled_start_date,
            projected_start_date = excluded.projected_start_date,
            priority = excluded.priority,
            updated_at = excluded.updated_at
        "#,
        params![
            record.id,
            record.name,
            record.status,
            record.kind.as_str(),
            record.archived,
            record.remaining_hours,
            record.total_estimated_hours,
            record.scheduled_start_date.map(|d| d.format(DATE_FORMAT).to_string()),
            record.projected_start_date.map(|d| d.format(DATE_FORMAT).to_string()),
            record.priority,
        ],
    )
}

/// 日期列解析失败按缺失处理（与引擎的降级策略一致）
fn parse_date_column(value: Option<String>) -> Option<NaiveDate> {
    value.and_then(|s| NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok())
}

fn map_project_row(row: &Row<'_>) -> rusqlite::Result<ProjectRecord> {
    let kind_raw: String = row.get(3)?;
    let kind = kind_raw.parse::<DemandKind>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, Type::Text, e.into())
    })?;

    Ok(ProjectRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        status: row.get(2)?,
        kind,
        archived: row.get(4)?,
        remaining_hours: row.get(5)?,
        total_estimated_hours: row.get(6)?,
        scheduled_start_date: parse_date_column(row.get(7)?),
        projected_start_date: parse_date_column(row.get(8)?),
        priority: row.get(9)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;

    fn setup_repo() -> ProjectRepository {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        ProjectRepository::from_connection(Arc::new(Mutex::new(conn)))
    }

    fn record(id: &str, kind: DemandKind) -> ProjectRecord {
        ProjectRecord {
            id: id.to_string(),
            name: format!("Project {}", id),
            status: "awarded".to_string(),
            kind,
            archived: false,
            remaining_hours: Some(120.0),
            total_estimated_hours: Some(300.0),
            scheduled_start_date: NaiveDate::from_ymd_opt(2026, 11, 2),
            projected_start_date: None,
            priority: Some(3),
        }
    }

    #[test]
    fn test_upsert_and_find() {
        let repo = setup_repo();
        repo.upsert(&record("P1", DemandKind::Committed)).unwrap();

        let found = repo.find_by_id("P1").unwrap().unwrap();
        assert_eq!(found, record("P1", DemandKind::Committed));
        assert!(repo.find_by_id("missing").unwrap().is_none());
    }

    #[test]
    fn test_upsert_updates_in_place() {
        let repo = setup_repo();
        repo.upsert(&record("P1", DemandKind::Pending)).unwrap();
        repo.upsert(&record("P2", DemandKind::Pending)).unwrap();

        let mut updated = record("P1", DemandKind::Pending);
        updated.remaining_hours = Some(40.0);
        repo.upsert(&updated).unwrap();

        let active = repo.list_active(DemandKind::Pending).unwrap();
        assert_eq!(active.len(), 2);
        // 更新不改变写入顺序
        assert_eq!(active[0].id, "P1");
        assert_eq!(active[0].remaining_hours, Some(40.0));
    }

    #[test]
    fn test_list_active_filters_kind_and_archived() {
        let repo = setup_repo();
        repo.batch_upsert(&[
            record("C1", DemandKind::Committed),
            record("C2", DemandKind::Committed),
            record("B1", DemandKind::Pending),
        ])
        .unwrap();
        repo.set_archived("C2", true).unwrap();

        let committed = repo.list_active(DemandKind::Committed).unwrap();
        assert_eq!(committed.len(), 1);
        assert_eq!(committed[0].id, "C1");

        let demands = repo.list_active_demands(DemandKind::Pending).unwrap();
        assert_eq!(demands.len(), 1);
        assert_eq!(demands[0].remaining_hours, 120.0);
    }

    #[test]
    fn test_set_archived_missing_is_not_found() {
        let repo = setup_repo();
        let err = repo.set_archived("nope", true).unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
    }

    #[test]
    fn test_delete() {
        let repo = setup_repo();
        repo.upsert(&record("P1", DemandKind::Committed)).unwrap();
        assert!(repo.delete("P1").unwrap());
        assert!(!repo.delete("P1").unwrap());
    }
}
