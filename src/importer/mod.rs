// ==========================================
// ChemLizer - 导入层
// ==========================================
// 职责: 校验并转换上传的设备 CSV，生成上传记录
// 支持: CSV（逗号分隔，表头必需）
// ==========================================

// 模块声明
pub mod equipment_importer_impl;
pub mod equipment_importer_trait;
pub mod error;
pub mod row_coercer;
pub mod schema_validator;

// 重导出核心类型
pub use equipment_importer_impl::EquipmentImporterImpl;
pub use error::{ImportError, ImportResult};
pub use row_coercer::{CoercionFailure, EquipmentRowCoercer};
pub use schema_validator::{ColumnIndex, CsvSchemaValidator, ValidatedTable};

// 重导出 Trait 接口
pub use equipment_importer_trait::{EquipmentImporter, RowCoercer, SchemaValidator};
