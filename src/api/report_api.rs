// ==========================================
// ChemLizer - 报表 API
// ==========================================
// 职责: 为当前上传生成报表文档并写入文件
// 约束: 无当前上传时返回 NoData
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, UploadConfigReader};
use crate::domain::user::User;
use crate::report::{ReportDocument, ReportRenderer};
use crate::repository::UploadRepository;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, instrument};

pub struct ReportApi {
    upload_repo: Arc<UploadRepository>,
    config_manager: Arc<ConfigManager>,
}

impl ReportApi {
    pub fn new(upload_repo: Arc<UploadRepository>, config_manager: Arc<ConfigManager>) -> Self {
        Self {
            upload_repo,
            config_manager,
        }
    }

    /// 生成当前上传的报表文档（不落盘）
    pub fn build_report(&self, user: &User) -> ApiResult<ReportDocument> {
        let (record, rows) = self
            .upload_repo
            .latest_with_rows(user.user_id)?
            .ok_or_else(|| ApiError::NoData("No data available to generate report".to_string()))?;

        let rows_per_page = self.config_manager.get_report_rows_per_page()?;
        Ok(ReportRenderer::new(rows_per_page).render(&record, &rows))
    }

    /// 生成报表并写入 out_dir，返回文件路径
    #[instrument(skip(self, user, out_dir), fields(user_id = user.user_id))]
    pub async fn write_report(&self, user: &User, out_dir: &Path) -> ApiResult<PathBuf> {
        let document = self.build_report(user)?;
        let path = out_dir.join(&document.filename);

        tokio::fs::write(&path, document.render_text())
            .await
            .map_err(|e| {
                error!(path = %path.display(), error = %e, "报表写入失败");
                ApiError::FileError(format!("{}: {}", path.display(), e))
            })?;

        info!(
            path = %path.display(),
            pages = document.page_count(),
            "报表已生成"
        );
        Ok(path)
    }
}
