// ==========================================
// ChemLizer - 认证 API
// ==========================================
// 职责: 注册 / 登录 / 令牌解析 / 登出
// 口令存储: "盐$sha256(盐 + 口令)" 十六进制摘要
// 令牌: 每用户一个，登录时获取或创建
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::user::{AuthSession, User};
use crate::repository::{RepositoryError, UserRepository};
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

pub struct AuthApi {
    user_repo: Arc<UserRepository>,
}

impl AuthApi {
    pub fn new(user_repo: Arc<UserRepository>) -> Self {
        Self { user_repo }
    }

    /// 注册新用户
    pub fn register(&self, username: &str, password: &str) -> ApiResult<User> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ApiError::InvalidInput("用户名不能为空".to_string()));
        }
        if password.is_empty() {
            return Err(ApiError::InvalidInput("口令不能为空".to_string()));
        }

        let salt = Uuid::new_v4().simple().to_string();
        let stored = format!("{}${}", salt, digest(&salt, password));

        let user = self
            .user_repo
            .create(username, &stored)
            .map_err(|e| match e {
                RepositoryError::UniqueConstraintViolation(_) => {
                    ApiError::InvalidInput(format!("用户名已存在: {}", username))
                }
                other => ApiError::from(other),
            })?;

        info!(user_id = user.user_id, username = %user.username, "用户已注册");
        Ok(user)
    }

    /// 登录，返回用户身份与会话令牌
    pub fn login(&self, username: &str, password: &str) -> ApiResult<AuthSession> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(ApiError::AuthError(INVALID_CREDENTIALS.to_string()));
        }

        let Some(entity) = self.user_repo.find_by_username(username.trim())? else {
            warn!(username = %username, "登录失败: 用户不存在");
            return Err(ApiError::AuthError(INVALID_CREDENTIALS.to_string()));
        };

        if !verify_password(&entity.password_hash, password) {
            warn!(username = %username, "登录失败: 口令错误");
            return Err(ApiError::AuthError(INVALID_CREDENTIALS.to_string()));
        }

        let token = self.user_repo.get_or_create_token(entity.user.user_id)?;
        info!(user_id = entity.user.user_id, "登录成功");

        Ok(AuthSession {
            token,
            user: entity.user,
            issued_at: Utc::now(),
        })
    }

    /// 令牌 → 用户
    pub fn authenticate(&self, token: &str) -> ApiResult<User> {
        self.user_repo
            .find_by_token(token.trim())?
            .ok_or_else(|| ApiError::AuthError("Invalid token".to_string()))
    }

    /// 登出（删除令牌）
    pub fn logout(&self, token: &str) -> ApiResult<()> {
        if !self.user_repo.delete_token(token.trim())? {
            return Err(ApiError::AuthError("Invalid token".to_string()));
        }
        Ok(())
    }
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

fn verify_password(stored: &str, password: &str) -> bool {
    match stored.split_once('$') {
        Some((salt, expected)) => digest(salt, password) == expected,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_digest_roundtrip() {
        let stored = format!("abc${}", digest("abc", "secret"));
        assert!(verify_password(&stored, "secret"));
        assert!(!verify_password(&stored, "Secret"));
        assert!(!verify_password("no-separator", "secret"));
    }

    #[test]
    fn test_digest_depends_on_salt() {
        assert_ne!(digest("s1", "pw"), digest("s2", "pw"));
        assert_eq!(digest("s1", "pw").len(), 64);
    }
}
