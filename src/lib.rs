// ==========================================
// ChemLizer - 核心库
// ==========================================
// 系统定位: 化工设备 CSV 上传、统计、查询与报表
// 技术栈: Rust + SQLite
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 统计
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 报表层
pub mod report;

// 应用层 - 状态组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{
    AuthSession, CurrentSummary, EquipmentRecord, EquipmentRow, NumericField, SummaryStatistics,
    UploadHistoryEntry, UploadRecord, User,
};

// 引擎
pub use engine::StatisticsEngine;

// API
pub use api::{ApiError, ApiResult, AuthApi, EquipmentApi, ReportApi, UploadApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "ChemLizer";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert_eq!(APP_NAME, "ChemLizer");
    }
}
