// ==========================================
// ChemLizer - 用户与令牌仓储
// ==========================================
// 职责: app_user / auth_token 两表的读写
// 红线: 不做口令校验，只存取摘要
// ==========================================

use crate::domain::user::User;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// 用户记录（含口令摘要，仅供认证服务使用）
#[derive(Debug, Clone)]
pub struct UserCredentialEntity {
    pub user: User,
    pub password_hash: String,
}

pub struct UserRepository {
    conn: Arc<Mutex<Connection>>,
}

impl UserRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新建用户（用户名重复时返回 UniqueConstraintViolation）
    pub fn create(&self, username: &str, password_hash: &str) -> RepositoryResult<User> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO app_user (username, password_hash, created_at) VALUES (?1, ?2, ?3)",
            params![
                username,
                password_hash,
                Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
            ],
        )?;

        Ok(User {
            user_id: conn.last_insert_rowid(),
            username: username.to_string(),
        })
    }

    pub fn find_by_username(&self, username: &str) -> RepositoryResult<Option<UserCredentialEntity>> {
        let conn = self.get_conn()?;
        let entity = conn
            .query_row(
                "SELECT user_id, username, password_hash FROM app_user WHERE username = ?1",
                params![username],
                |row| {
                    Ok(UserCredentialEntity {
                        user: User {
                            user_id: row.get(0)?,
                            username: row.get(1)?,
                        },
                        password_hash: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(entity)
    }

    /// 获取用户令牌，不存在则创建（每用户一个令牌）
    pub fn get_or_create_token(&self, user_id: i64) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        let existing: Option<String> = conn
            .query_row(
                "SELECT token FROM auth_token WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(token) = existing {
            return Ok(token);
        }

        let token = Uuid::new_v4().simple().to_string();
        conn.execute(
            "INSERT INTO auth_token (token, user_id, created_at) VALUES (?1, ?2, ?3)",
            params![
                token,
                user_id,
                Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
            ],
        )?;
        Ok(token)
    }

    pub fn find_by_token(&self, token: &str) -> RepositoryResult<Option<User>> {
        let conn = self.get_conn()?;
        let user = conn
            .query_row(
                r#"
                SELECT u.user_id, u.username
                FROM auth_token t
                JOIN app_user u ON u.user_id = t.user_id
                WHERE t.token = ?1
                "#,
                params![token],
                |row| {
                    Ok(User {
                        user_id: row.get(0)?,
                        username: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    /// 删除令牌，返回是否存在
    pub fn delete_token(&self, token: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let n = conn.execute("DELETE FROM auth_token WHERE token = ?1", params![token])?;
        Ok(n > 0)
    }
}
