// ==========================================
// 钢结构车间产能预测 - 配置管理器
// ==========================================
// 职责: 公司配置加载、查询、写入、快照
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::company_settings::{
    DEFAULT_BASE_WEEKLY_CAPACITY_HOURS, DEFAULT_FORECAST_WEEKS, DEFAULT_UNDER_UTILIZED_THRESHOLD,
};
use crate::config::settings_provider::CompanySettingsProvider;
use crate::db::open_sqlite_connection;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, Mutex};
use tracing::warn;

type ConfigResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

/// 配置键
pub mod config_keys {
    pub const BASE_WEEKLY_CAPACITY_HOURS: &str = "base_weekly_capacity_hours";
    pub const FORECAST_WEEKS: &str = "forecast_weeks";
    pub const UNDER_UTILIZED_THRESHOLD: &str = "under_utilized_threshold";
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        Ok(value)
    }

    /// 读取并解析配置值，缺失或无法解析时返回默认值
    fn get_parsed_or_default<T>(&self, key: &str, default: T) -> ConfigResult<T>
    where
        T: std::str::FromStr + Copy,
    {
        match self.get_config_value(key)? {
            Some(raw) => match raw.trim().parse::<T>() {
                Ok(v) => Ok(v),
                Err(_) => {
                    warn!(key = key, value = %raw, "配置值无法解析, 使用默认值");
                    Ok(default)
                }
            },
            None => Ok(default),
        }
    }

    /// 写入配置值（scope_id='global'，存在则覆盖）
    pub fn set_config(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES ('global', ?1, ?2, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;

        Ok(())
    }

    /// 获取所有配置的快照（JSON格式）
    ///
    /// # 用途
    /// - 与预测结果一同输出, 便于追溯本次预测使用的配置
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&config_map)?)
    }
}

// ==========================================
// CompanySettingsProvider 实现
// ==========================================
#[async_trait]
impl CompanySettingsProvider for ConfigManager {
    async fn get_base_weekly_capacity_hours(&self) -> ConfigResult<f64> {
        let value = self.get_parsed_or_default(
            config_keys::BASE_WEEKLY_CAPACITY_HOURS,
            DEFAULT_BASE_WEEKLY_CAPACITY_HOURS,
        )?;
        Ok(if value.is_finite() {
            value
        } else {
            DEFAULT_BASE_WEEKLY_CAPACITY_HOURS
        })
    }

    async fn get_forecast_weeks(&self) -> ConfigResult<i32> {
        self.get_parsed_or_default(config_keys::FORECAST_WEEKS, DEFAULT_FORECAST_WEEKS)
    }

    async fn get_under_utilized_threshold(&self) -> ConfigResult<f64> {
        let value = self.get_parsed_or_default(
            config_keys::UNDER_UTILIZED_THRESHOLD,
            DEFAULT_UNDER_UTILIZED_THRESHOLD,
        )?;
        Ok(if value.is_finite() {
            value
        } else {
            DEFAULT_UNDER_UTILIZED_THRESHOLD
        })
    }
}
