// ==========================================
// ChemLizer - 引擎层
// ==========================================
// 职责: 纯计算规则，不访问数据库
// ==========================================

pub mod statistics;

pub use statistics::{round2, StatisticsEngine};
