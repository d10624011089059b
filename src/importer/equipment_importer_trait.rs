// ==========================================
// ChemLizer - 设备数据导入 Trait
// ==========================================
// 职责: 定义导入管道各阶段接口（不包含实现）
// 管道: 结构校验 → 类型转换 → 统计 → 落库 → 保留策略
// ==========================================

use crate::domain::equipment::{EquipmentRecord, UploadOutcome};
use crate::domain::user::User;
use crate::importer::error::ImportResult;
use crate::importer::row_coercer::CoercionFailure;
use crate::importer::schema_validator::ValidatedTable;
use async_trait::async_trait;
use std::path::Path;

// ==========================================
// EquipmentImporter Trait
// ==========================================
// 用途: 设备 CSV 导入主接口
// 实现者: EquipmentImporterImpl
#[async_trait]
pub trait EquipmentImporter: Send + Sync {
    /// 导入一份已读入内存的 CSV
    ///
    /// # 参数
    /// - user: 已认证用户（上传归属）
    /// - filename: 原始文件名（仅记录，不做扩展名校验）
    /// - bytes: 文件原始字节
    ///
    /// # 返回
    /// - Ok(UploadOutcome): 上传 ID + 统计摘要
    /// - Err: 校验错误（存储未变）或落库错误
    async fn import_bytes(
        &self,
        user: &User,
        filename: &str,
        bytes: &[u8],
    ) -> ImportResult<UploadOutcome>;

    /// 从 CSV 文件导入
    ///
    /// # 参数
    /// - user: 已认证用户
    /// - file_path: CSV 文件路径（文件名取路径最后一段）
    async fn import_from_csv<P: AsRef<Path> + Send>(
        &self,
        user: &User,
        file_path: P,
    ) -> ImportResult<UploadOutcome>;
}

// ==========================================
// SchemaValidator Trait
// ==========================================
// 用途: 结构校验接口（阶段 0）
// 实现者: CsvSchemaValidator
pub trait SchemaValidator: Send + Sync {
    /// 校验表头与数据行数，不解析单元格值
    ///
    /// # 返回
    /// - Ok(ValidatedTable): 表头已规范化的表
    /// - Err: FormatError / SchemaError / EmptyInputError
    fn validate(&self, bytes: &[u8]) -> ImportResult<ValidatedTable>;
}

// ==========================================
// RowCoercer Trait
// ==========================================
// 用途: 行类型转换接口（阶段 1）
// 实现者: EquipmentRowCoercer
pub trait RowCoercer: Send + Sync {
    /// 转换全部数据行
    ///
    /// # 返回
    /// - Ok(Vec<EquipmentRecord>): 与源文件同序的设备记录
    /// - Err(CoercionFailure): 首个被拒绝的数值列
    fn coerce(&self, table: &ValidatedTable) -> Result<Vec<EquipmentRecord>, CoercionFailure>;
}
