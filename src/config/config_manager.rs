// ==========================================
// ChemLizer - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value)
// ==========================================

use crate::config::upload_config_trait::UploadConfigReader;
use crate::db::{ensure_schema, open_sqlite_connection};
use crate::repository::{RepositoryError, RepositoryResult, DEFAULT_RETENTION_KEEP_COUNT};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tracing::warn;

/// 报表每页默认行数
pub const DEFAULT_REPORT_ROWS_PER_PAGE: usize = 40;

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
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        ensure_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 从 config_kv 表读取配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入配置值（存在则覆盖）
    pub fn set_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO config_kv (key, value, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// 全部配置快照
    pub fn list_values(&self) -> RepositoryResult<BTreeMap<String, String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT key, value FROM config_kv ORDER BY key")?;
        let values = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<rusqlite::Result<BTreeMap<_, _>>>()?;
        Ok(values)
    }

    /// 读取正整数配置，缺失或非法时回退默认值
    fn get_positive_or_default(&self, key: &str, default: usize) -> RepositoryResult<usize> {
        match self.get_value(key)? {
            None => Ok(default),
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(v) if v >= 1 => Ok(v),
                _ => {
                    warn!(key, value = %raw, default, "配置值非法，使用默认值");
                    Ok(default)
                }
            },
        }
    }
}

impl UploadConfigReader for ConfigManager {
    fn get_retention_keep_count(&self) -> RepositoryResult<usize> {
        self.get_positive_or_default(config_keys::RETENTION_KEEP_COUNT, DEFAULT_RETENTION_KEEP_COUNT)
    }

    fn get_report_rows_per_page(&self) -> RepositoryResult<usize> {
        self.get_positive_or_default(config_keys::REPORT_ROWS_PER_PAGE, DEFAULT_REPORT_ROWS_PER_PAGE)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 上传保留策略（只影响清理；历史查询固定返回最近 5 条）
    pub const RETENTION_KEEP_COUNT: &str = "upload.retention_keep_count";

    // 报表
    pub const REPORT_ROWS_PER_PAGE: &str = "report.rows_per_page";
}
