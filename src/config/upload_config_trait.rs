// ==========================================
// ChemLizer - 上传/报表配置读取 Trait
// ==========================================
// 职责: 定义导入与报表所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入
// ==========================================

use crate::repository::RepositoryResult;
use std::sync::Arc;

// ==========================================
// UploadConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
pub trait UploadConfigReader: Send + Sync {
    /// 每用户保留的上传记录数
    ///
    /// # 默认值
    /// - 5（配置值 < 1 或无法解析时回退默认值）
    fn get_retention_keep_count(&self) -> RepositoryResult<usize>;

    /// 报表每页设备行数
    ///
    /// # 默认值
    /// - 40
    fn get_report_rows_per_page(&self) -> RepositoryResult<usize>;
}

// 共享实例（AppState 中以 Arc 持有 ConfigManager）
impl<T> UploadConfigReader for Arc<T>
where
    T: UploadConfigReader + ?Sized,
{
    fn get_retention_keep_count(&self) -> RepositoryResult<usize> {
        (**self).get_retention_keep_count()
    }

    fn get_report_rows_per_page(&self) -> RepositoryResult<usize> {
        (**self).get_report_rows_per_page()
    }
}
