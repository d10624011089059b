// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、用户注册、CSV 构造等功能
// ==========================================

#![allow(dead_code)]

use chemlizer::app::AppState;
use chemlizer::db::{ensure_schema, open_sqlite_connection};
use chemlizer::domain::User;
use std::error::Error;
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().ok_or("非 UTF-8 路径")?.to_string();

    let conn = open_sqlite_connection(&db_path)?;
    ensure_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 创建测试数据库 + AppState
pub fn create_test_state() -> (NamedTempFile, AppState) {
    let (temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let state = AppState::new(db_path).expect("Failed to create AppState");
    (temp_file, state)
}

/// 注册测试用户
pub fn register_user(state: &AppState, username: &str) -> User {
    state
        .auth_api
        .register(username, "secret-pw")
        .expect("Failed to register user")
}

/// 按行构造设备 CSV（标准列顺序）
pub fn equipment_csv(rows: &[(&str, &str, f64, f64, f64)]) -> String {
    let mut csv = String::from("Equipment Name,Type,Flowrate,Pressure,Temperature\n");
    for (name, kind, flowrate, pressure, temperature) in rows {
        csv.push_str(&format!(
            "{},{},{},{},{}\n",
            name, kind, flowrate, pressure, temperature
        ));
    }
    csv
}

/// 读取 fixtures 目录下的文件
pub fn fixture_bytes(name: &str) -> Vec<u8> {
    std::fs::read(format!("tests/fixtures/{}", name)).expect("Failed to read fixture")
}

/// 直接统计数据库表行数
pub fn count_table_rows(db_path: &str, table: &str) -> i64 {
    let conn = open_sqlite_connection(db_path).expect("Failed to open db");
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
        .expect("Failed to count rows")
}
