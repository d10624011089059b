// ==========================================
// ChemLizer - 报表层
// ==========================================
// 职责: 将当前上传快照排版为分页文档
// 红线: 只消费查询层结果，不直接访问数据库
// ==========================================

pub mod renderer;

pub use renderer::{report_filename, ReportDocument, ReportPage, ReportRenderer, REPORT_TITLE};
