// ==========================================
// ChemLizer - 用户与会话领域模型
// ==========================================
// 核心操作只接收显式的 User，不持有任何全局会话状态
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 已认证用户
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: i64,
    pub username: String,
}

/// 登录结果：用户身份 + 不透明会话令牌
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
    pub issued_at: DateTime<Utc>,
}
