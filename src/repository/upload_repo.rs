// ==========================================
// ChemLizer - 上传记录仓储
// ==========================================
// 职责: upload_record / equipment 两表的读写
// 红线: Repository 不含统计逻辑，只做数据 CRUD
// 约束:
// - 上传记录与设备行在同一事务内写入（全有或全无）
// - 保留策略每次都按当前数据重新计算“最近 N 条之外”的记录
// - 排序口径: uploaded_at DESC, upload_id DESC
// ==========================================

use crate::db::{ensure_schema, open_sqlite_connection};
use crate::domain::equipment::{EquipmentRow, NewUpload, UploadHistoryEntry, UploadRecord};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// 默认保留的上传记录数（每用户）
pub const DEFAULT_RETENTION_KEEP_COUNT: usize = 5;

/// 时间戳落库格式（微秒精度，字典序即时间序）
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(idx: usize, raw: &str) -> SqliteResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

const UPLOAD_COLUMNS: &str = r#"
    upload_id, user_id, filename, uploaded_at, num_records,
    avg_flowrate, avg_pressure, avg_temperature, avg_reserved
"#;

fn map_upload_row(row: &Row) -> SqliteResult<UploadRecord> {
    Ok(UploadRecord {
        upload_id: row.get(0)?,
        user_id: row.get(1)?,
        filename: row.get(2)?,
        uploaded_at: parse_timestamp(3, &row.get::<_, String>(3)?)?,
        num_records: row.get(4)?,
        avg_flowrate: row.get::<_, Option<f64>>(5)?.unwrap_or(0.0),
        avg_pressure: row.get::<_, Option<f64>>(6)?.unwrap_or(0.0),
        avg_temperature: row.get::<_, Option<f64>>(7)?.unwrap_or(0.0),
        avg_reserved: row.get(8)?,
    })
}

fn map_equipment_row(row: &Row) -> SqliteResult<EquipmentRow> {
    Ok(EquipmentRow {
        equipment_id: row.get(0)?,
        upload_id: row.get(1)?,
        equipment_name: row.get(2)?,
        equipment_type: row.get(3)?,
        flowrate: row.get(4)?,
        pressure: row.get(5)?,
        temperature: row.get(6)?,
    })
}

// ==========================================
// UploadRepository - 上传记录仓储
// ==========================================
pub struct UploadRepository {
    conn: Arc<Mutex<Connection>>,
}

impl UploadRepository {
    /// 创建新的 UploadRepository 实例（独立连接）
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        ensure_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 写入
    // ==========================================

    /// 提交一次上传：记录 + 全部设备行，单事务
    ///
    /// # 返回
    /// - Ok(upload_id): 新记录 ID
    /// - Err: 任一步失败则整个事务回滚，读方看不到半成品
    pub fn commit(&self, upload: &NewUpload) -> RepositoryResult<i64> {
        if upload.rows.is_empty() {
            return Err(RepositoryError::FieldValueError {
                field: "rows".to_string(),
                message: "上传记录至少需要一行设备数据".to_string(),
            });
        }

        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        tx.execute(
            r#"
            INSERT INTO upload_record (
                user_id, filename, uploaded_at, num_records,
                avg_flowrate, avg_pressure, avg_temperature, avg_reserved
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL)
            "#,
            params![
                upload.user_id,
                upload.filename,
                format_timestamp(&Utc::now()),
                upload.num_records,
                upload.avg_flowrate,
                upload.avg_pressure,
                upload.avg_temperature,
            ],
        )?;
        let upload_id = tx.last_insert_rowid();

        // 批量写入设备行
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO equipment (
                    upload_id, equipment_name, equipment_type,
                    flowrate, pressure, temperature
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )?;

            for row in &upload.rows {
                stmt.execute(params![
                    upload_id,
                    row.name,
                    row.equipment_type,
                    row.flowrate,
                    row.pressure,
                    row.temperature,
                ])?;
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        debug!(upload_id, rows = upload.rows.len(), "上传记录已提交");
        Ok(upload_id)
    }

    /// 保留策略：删除该用户最近 keep_count 条之外的全部上传（设备行级联删除）
    ///
    /// 幂等：无新增上传时再次执行不删除任何记录
    ///
    /// # 返回
    /// - Ok(usize): 本次删除的上传记录数
    pub fn enforce_retention(&self, user_id: i64, keep_count: usize) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let deleted = tx.execute(
            r#"
            DELETE FROM upload_record
            WHERE user_id = ?1
              AND upload_id NOT IN (
                  SELECT upload_id FROM upload_record
                  WHERE user_id = ?1
                  ORDER BY uploaded_at DESC, upload_id DESC
                  LIMIT ?2
              )
            "#,
            params![user_id, keep_count as i64],
        )?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        Ok(deleted)
    }

    /// 删除指定上传（仅限本人的记录）
    ///
    /// # 返回
    /// - Ok(true): 已删除
    /// - Ok(false): 记录不存在或不属于该用户
    pub fn delete_upload(&self, user_id: i64, upload_id: i64) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let deleted = conn.execute(
            "DELETE FROM upload_record WHERE upload_id = ?1 AND user_id = ?2",
            params![upload_id, user_id],
        )?;
        Ok(deleted > 0)
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 查询用户最近一次上传
    ///
    /// # 返回
    /// - Ok(Some(UploadRecord)): 最近一次上传
    /// - Ok(None): 用户尚无上传
    pub fn latest(&self, user_id: i64) -> RepositoryResult<Option<UploadRecord>> {
        let conn = self.get_conn()?;
        Self::latest_with(&conn, user_id)
    }

    fn latest_with(conn: &Connection, user_id: i64) -> RepositoryResult<Option<UploadRecord>> {
        let sql = format!(
            r#"
            SELECT {UPLOAD_COLUMNS}
            FROM upload_record
            WHERE user_id = ?1
            ORDER BY uploaded_at DESC, upload_id DESC
            LIMIT 1
            "#
        );
        let record = conn
            .query_row(&sql, params![user_id], map_upload_row)
            .optional()?;
        Ok(record)
    }

    /// 查询指定上传的全部设备行（按设备名称排序）
    pub fn rows_for_upload(&self, upload_id: i64) -> RepositoryResult<Vec<EquipmentRow>> {
        let conn = self.get_conn()?;
        Self::rows_with(&conn, upload_id)
    }

    fn rows_with(conn: &Connection, upload_id: i64) -> RepositoryResult<Vec<EquipmentRow>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT equipment_id, upload_id, equipment_name, equipment_type,
                   flowrate, pressure, temperature
            FROM equipment
            WHERE upload_id = ?1
            ORDER BY equipment_name ASC, equipment_id ASC
            "#,
        )?;

        let rows = stmt
            .query_map(params![upload_id], map_equipment_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// 最近一次上传及其设备行（同一读事务内取得，二者一致）
    pub fn latest_with_rows(
        &self,
        user_id: i64,
    ) -> RepositoryResult<Option<(UploadRecord, Vec<EquipmentRow>)>> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let result = match Self::latest_with(&tx, user_id)? {
            Some(record) => {
                let rows = Self::rows_with(&tx, record.upload_id)?;
                Some((record, rows))
            }
            None => None,
        };

        tx.commit()?;
        Ok(result)
    }

    /// 上传历史（最近优先，最多 limit 条，只读投影）
    pub fn history(&self, user_id: i64, limit: usize) -> RepositoryResult<Vec<UploadHistoryEntry>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT r.upload_id, r.filename, u.username, r.uploaded_at, r.num_records,
                   r.avg_flowrate, r.avg_pressure, r.avg_temperature
            FROM upload_record r
            JOIN app_user u ON u.user_id = r.user_id
            WHERE r.user_id = ?1
            ORDER BY r.uploaded_at DESC, r.upload_id DESC
            LIMIT ?2
            "#,
        )?;

        let entries = stmt
            .query_map(params![user_id, limit as i64], |row| {
                Ok(UploadHistoryEntry {
                    upload_id: row.get(0)?,
                    filename: row.get(1)?,
                    username: row.get(2)?,
                    uploaded_at: parse_timestamp(3, &row.get::<_, String>(3)?)?,
                    num_records: row.get(4)?,
                    avg_flowrate: row.get::<_, Option<f64>>(5)?.unwrap_or(0.0),
                    avg_pressure: row.get::<_, Option<f64>>(6)?.unwrap_or(0.0),
                    avg_temperature: row.get::<_, Option<f64>>(7)?.unwrap_or(0.0),
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(entries)
    }

    /// 统计用户的上传记录数
    #[cfg(test)]
    fn count_uploads(&self, user_id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM upload_record WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// 统计指定上传的设备行数（含已被级联删除后的 0）
    #[cfg(test)]
    fn count_rows(&self, upload_id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM equipment WHERE upload_id = ?1",
            params![upload_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::configure_sqlite_connection;
    use crate::domain::equipment::EquipmentRecord;

    fn setup_test_db() -> (Arc<Mutex<Connection>>, i64) {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        ensure_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO app_user (username, password_hash, created_at) VALUES ('alice', 'x', '2026-01-01T00:00:00Z')",
            [],
        )
        .unwrap();
        let user_id = conn.last_insert_rowid();
        (Arc::new(Mutex::new(conn)), user_id)
    }

    fn make_upload(user_id: i64, filename: &str) -> NewUpload {
        NewUpload {
            user_id,
            filename: filename.to_string(),
            num_records: 2,
            avg_flowrate: 7.5,
            avg_pressure: 1.75,
            avg_temperature: 22.5,
            rows: vec![
                EquipmentRecord {
                    name: "Valve-1".to_string(),
                    equipment_type: "Valve".to_string(),
                    flowrate: 5.0,
                    pressure: 1.5,
                    temperature: 20.0,
                },
                EquipmentRecord {
                    name: "Pump-1".to_string(),
                    equipment_type: "Pump".to_string(),
                    flowrate: 10.0,
                    pressure: 2.0,
                    temperature: 25.0,
                },
            ],
        }
    }

    #[test]
    fn test_commit_and_latest() {
        let (conn, user_id) = setup_test_db();
        let repo = UploadRepository::from_connection(conn);

        assert!(repo.latest(user_id).unwrap().is_none());

        let upload_id = repo.commit(&make_upload(user_id, "a.csv")).unwrap();
        let latest = repo.latest(user_id).unwrap().unwrap();

        assert_eq!(latest.upload_id, upload_id);
        assert_eq!(latest.filename, "a.csv");
        assert_eq!(latest.num_records, 2);
        assert_eq!(latest.avg_pressure, 1.75);
        assert_eq!(latest.avg_reserved, None);

        let rows = repo.rows_for_upload(upload_id).unwrap();
        assert_eq!(rows.len(), 2);
        // 按设备名称排序
        assert_eq!(rows[0].equipment_name, "Pump-1");
        assert_eq!(rows[1].equipment_name, "Valve-1");
    }

    #[test]
    fn test_commit_rejects_empty_rows() {
        let (conn, user_id) = setup_test_db();
        let repo = UploadRepository::from_connection(conn);

        let mut upload = make_upload(user_id, "empty.csv");
        upload.rows.clear();

        assert!(repo.commit(&upload).is_err());
        assert_eq!(repo.count_uploads(user_id).unwrap(), 0);
    }

    #[test]
    fn test_commit_unknown_user_leaves_nothing() {
        let (conn, _user_id) = setup_test_db();
        let repo = UploadRepository::from_connection(conn);

        let result = repo.commit(&make_upload(9999, "ghost.csv"));
        assert!(matches!(result, Err(RepositoryError::ForeignKeyViolation(_))));
        assert_eq!(repo.count_uploads(9999).unwrap(), 0);
    }

    #[test]
    fn test_commit_failing_midway_rolls_back_record() {
        let (conn, user_id) = setup_test_db();
        let repo = UploadRepository::from_connection(conn);

        // 首行写入成功，第二行 NaN 落库为 NULL 触发 NOT NULL 约束
        let mut upload = make_upload(user_id, "broken.csv");
        upload.rows[1].flowrate = f64::NAN;

        let result = repo.commit(&upload);
        assert!(matches!(result, Err(RepositoryError::DatabaseQueryError(_))));
        assert_eq!(repo.count_uploads(user_id).unwrap(), 0);
        assert!(repo.latest_with_rows(user_id).unwrap().is_none());

        // 回滚后连接仍可正常提交
        let upload_id = repo.commit(&make_upload(user_id, "ok.csv")).unwrap();
        assert_eq!(repo.count_rows(upload_id).unwrap(), 2);
        assert_eq!(repo.count_uploads(user_id).unwrap(), 1);
    }

    #[test]
    fn test_retention_keeps_most_recent_and_cascades() {
        let (conn, user_id) = setup_test_db();
        let repo = UploadRepository::from_connection(conn);

        let ids: Vec<i64> = (0..7)
            .map(|i| repo.commit(&make_upload(user_id, &format!("f{}.csv", i))).unwrap())
            .collect();

        let deleted = repo.enforce_retention(user_id, 5).unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(repo.count_uploads(user_id).unwrap(), 5);

        // 最早的两条及其设备行被删除
        assert_eq!(repo.count_rows(ids[0]).unwrap(), 0);
        assert_eq!(repo.count_rows(ids[1]).unwrap(), 0);
        assert_eq!(repo.count_rows(ids[6]).unwrap(), 2);

        // 幂等
        assert_eq!(repo.enforce_retention(user_id, 5).unwrap(), 0);
        assert_eq!(repo.count_uploads(user_id).unwrap(), 5);
    }

    #[test]
    fn test_history_descending() {
        let (conn, user_id) = setup_test_db();
        let repo = UploadRepository::from_connection(conn);

        for i in 0..3 {
            repo.commit(&make_upload(user_id, &format!("f{}.csv", i))).unwrap();
        }

        let history = repo.history(user_id, 5).unwrap();
        let names: Vec<&str> = history.iter().map(|h| h.filename.as_str()).collect();
        assert_eq!(names, vec!["f2.csv", "f1.csv", "f0.csv"]);
        assert!(history.iter().all(|h| h.username == "alice"));
    }

    #[test]
    fn test_delete_upload_scoped_to_owner() {
        let (conn, user_id) = setup_test_db();
        let repo = UploadRepository::from_connection(conn);

        let upload_id = repo.commit(&make_upload(user_id, "a.csv")).unwrap();

        assert!(!repo.delete_upload(user_id + 1, upload_id).unwrap());
        assert!(repo.delete_upload(user_id, upload_id).unwrap());
        assert_eq!(repo.count_rows(upload_id).unwrap(), 0);
        assert!(repo.latest_with_rows(user_id).unwrap().is_none());
    }
}
