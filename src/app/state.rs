// ==========================================
// ChemLizer - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{AuthApi, EquipmentApi, ReportApi, UploadApi};
use crate::config::ConfigManager;
use crate::db::{ensure_schema, open_sqlite_connection};
use crate::repository::{UploadRepository, UserRepository};

/// 应用状态
///
/// 所有仓储共享同一数据库连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    pub auth_api: Arc<AuthApi>,
    pub upload_api: Arc<UploadApi>,
    pub equipment_api: Arc<EquipmentApi>,
    pub report_api: Arc<ReportApi>,

    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（不存在时自动创建并建表）
    ///
    /// # 返回
    /// - Ok(AppState): 成功创建的应用状态
    /// - Err(String): 初始化错误
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!(db_path = %db_path, "初始化AppState");

        // 创建数据库连接（共享连接）
        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        ensure_schema(&conn).map_err(|e| format!("数据库表初始化失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let upload_repo = Arc::new(UploadRepository::from_connection(conn.clone()));
        let user_repo = Arc::new(UserRepository::from_connection(conn.clone()));
        let config_manager = Arc::new(ConfigManager::from_connection(conn));

        // ==========================================
        // 创建API实例
        // ==========================================
        let auth_api = Arc::new(AuthApi::new(user_repo));
        let upload_api = Arc::new(UploadApi::new(upload_repo.clone(), config_manager.clone()));
        let equipment_api = Arc::new(EquipmentApi::new(upload_repo.clone()));
        let report_api = Arc::new(ReportApi::new(upload_repo, config_manager.clone()));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            auth_api,
            upload_api,
            equipment_api,
            report_api,
            config_manager,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级: CHEMLIZER_DB_PATH 环境变量 > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var("CHEMLIZER_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./chemlizer.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("chemlizer");
        // 目录创建失败时退回当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("chemlizer.db");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(path.ends_with(".db"));
    }

    #[test]
    fn test_app_state_bootstraps_schema() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("state.db").to_string_lossy().to_string();

        let state = AppState::new(db_path.clone()).unwrap();
        assert_eq!(state.db_path, db_path);

        let user = state.auth_api.register("alice", "pw").unwrap();
        assert!(state.equipment_api.rows_for_current(&user).unwrap().is_empty());
    }
}
