// ==========================================
// ChemLizer - 应用层
// ==========================================
// 职责: 组装共享连接与 API 实例，供 CLI 使用
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState};
