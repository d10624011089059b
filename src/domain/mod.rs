// ==========================================
// ChemLizer - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含统计逻辑
// ==========================================

pub mod equipment;
pub mod summary;
pub mod types;
pub mod user;

// 重导出核心类型
pub use equipment::{
    EquipmentRecord, EquipmentRow, NewUpload, UploadHistoryEntry, UploadOutcome, UploadRecord,
};
pub use summary::{CurrentSummary, SummaryStatistics, TypeDistribution};
pub use types::{NumericField, REQUIRED_COLUMNS};
pub use user::{AuthSession, User};
