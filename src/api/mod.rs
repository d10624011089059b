// ==========================================
// ChemLizer - API 层
// ==========================================
// 职责: 提供业务 API 接口，供 CLI 命令调用
// ==========================================

pub mod auth_api;
pub mod equipment_api;
pub mod error;
pub mod report_api;
pub mod upload_api;

// 重导出核心类型
pub use auth_api::AuthApi;
pub use equipment_api::{EquipmentApi, SummaryResponse, HISTORY_LIMIT, NO_DATA_MESSAGE};
pub use error::{ApiError, ApiResult};
pub use report_api::ReportApi;
pub use upload_api::{UploadApi, UploadResponse, UPLOAD_SUCCESS_MESSAGE};
