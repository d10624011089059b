// ==========================================
// ChemLizer - 上传 API
// ==========================================
// 职责: 上传入口（文件名校验）+ 调用导入管道 + 显式删除
// 约束: 非 .csv 文件名在进入导入管道前拒绝
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::equipment::UploadOutcome;
use crate::domain::summary::SummaryStatistics;
use crate::domain::user::User;
use crate::importer::{EquipmentImporter, EquipmentImporterImpl};
use crate::repository::UploadRepository;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// 上传成功提示
pub const UPLOAD_SUCCESS_MESSAGE: &str = "File uploaded successfully";

/// 上传响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub upload_id: i64,
    /// 统计引擎完整输出
    pub summary: SummaryStatistics,
    /// 旧上传清理失败（本次上传已保存）
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub retention_failed: bool,
}

impl From<UploadOutcome> for UploadResponse {
    fn from(outcome: UploadOutcome) -> Self {
        if outcome.retention_failed {
            warn!(upload_id = outcome.upload_id, "上传已保存，但旧上传清理失败");
        }
        Self {
            message: UPLOAD_SUCCESS_MESSAGE.to_string(),
            upload_id: outcome.upload_id,
            summary: outcome.summary,
            retention_failed: outcome.retention_failed,
        }
    }
}

// ==========================================
// UploadApi
// ==========================================
pub struct UploadApi {
    upload_repo: Arc<UploadRepository>,
    importer: EquipmentImporterImpl<Arc<ConfigManager>>,
}

impl UploadApi {
    pub fn new(upload_repo: Arc<UploadRepository>, config_manager: Arc<ConfigManager>) -> Self {
        let importer =
            EquipmentImporterImpl::with_default_components(upload_repo.clone(), config_manager);
        Self {
            upload_repo,
            importer,
        }
    }

    /// 上传一份已读入内存的 CSV
    ///
    /// # 参数
    /// - user: 已认证用户
    /// - filename: 客户端文件名（必须以 .csv 结尾）
    /// - bytes: 文件内容
    pub async fn upload_csv(
        &self,
        user: &User,
        filename: &str,
        bytes: &[u8],
    ) -> ApiResult<UploadResponse> {
        check_csv_filename(filename)?;

        let outcome = self.importer.import_bytes(user, filename, bytes).await?;
        Ok(outcome.into())
    }

    /// 从本地文件上传
    pub async fn upload_file<P: AsRef<Path> + Send>(
        &self,
        user: &User,
        file_path: P,
    ) -> ApiResult<UploadResponse> {
        let path = file_path.as_ref();
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ApiError::InvalidInput(format!("无效的文件路径: {}", path.display())))?;
        check_csv_filename(filename)?;

        let outcome = self.importer.import_from_csv(user, path).await?;
        Ok(outcome.into())
    }

    /// 删除一条属于该用户的上传（设备行级联删除）
    pub fn delete_upload(&self, user: &User, upload_id: i64) -> ApiResult<()> {
        let deleted = self.upload_repo.delete_upload(user.user_id, upload_id)?;
        if !deleted {
            return Err(ApiError::NoData(format!("上传记录(id={})不存在", upload_id)));
        }
        info!(user_id = user.user_id, upload_id, "上传记录已删除");
        Ok(())
    }
}

/// 文件名扩展名校验（区分大小写）
fn check_csv_filename(filename: &str) -> ApiResult<()> {
    if !filename.ends_with(".csv") {
        warn!(filename = %filename, "拒绝非 CSV 文件");
        return Err(ApiError::InvalidInput("Only CSV files are allowed.".to_string()));
    }
    Ok(())
}
