// ==========================================
// ChemLizer - 设备数据查询 API
// ==========================================
// 职责: 当前上传的设备行 / 摘要 / 历史
// 范围: 所有读取只针对该用户最近一次上传（历史除外）
// ==========================================

use crate::api::error::ApiResult;
use crate::domain::equipment::{EquipmentRow, UploadHistoryEntry};
use crate::domain::summary::CurrentSummary;
use crate::domain::user::User;
use crate::engine::StatisticsEngine;
use crate::repository::{UploadRepository, DEFAULT_RETENTION_KEEP_COUNT};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// 历史记录条数上限（固定，不随保留配置变化）
pub const HISTORY_LIMIT: usize = DEFAULT_RETENTION_KEEP_COUNT;

/// 无数据提示
pub const NO_DATA_MESSAGE: &str = "No data available";

/// 摘要响应：无上传时 summary 为 null 并附带提示
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub summary: Option<CurrentSummary>,
}

impl From<Option<CurrentSummary>> for SummaryResponse {
    fn from(summary: Option<CurrentSummary>) -> Self {
        match summary {
            Some(s) => Self {
                message: None,
                summary: Some(s),
            },
            None => Self {
                message: Some(NO_DATA_MESSAGE.to_string()),
                summary: None,
            },
        }
    }
}

// ==========================================
// EquipmentApi
// ==========================================
pub struct EquipmentApi {
    upload_repo: Arc<UploadRepository>,
}

impl EquipmentApi {
    pub fn new(upload_repo: Arc<UploadRepository>) -> Self {
        Self { upload_repo }
    }

    /// 当前上传的全部设备行（无上传时为空列表）
    pub fn rows_for_current(&self, user: &User) -> ApiResult<Vec<EquipmentRow>> {
        match self.upload_repo.latest_with_rows(user.user_id)? {
            Some((_, rows)) => Ok(rows),
            None => Ok(Vec::new()),
        }
    }

    /// 当前上传的摘要
    ///
    /// - total_count / type_distribution: 按当前设备行实时计算
    /// - avg_*: 取上传记录中存储的平均值
    ///
    /// # 返回
    /// - Ok(None): 该用户没有任何上传
    pub fn summary_for_current(&self, user: &User) -> ApiResult<Option<CurrentSummary>> {
        let Some((record, rows)) = self.upload_repo.latest_with_rows(user.user_id)? else {
            debug!(user_id = user.user_id, "无当前上传");
            return Ok(None);
        };

        let type_distribution =
            StatisticsEngine::type_distribution(rows.iter().map(|r| r.equipment_type.as_str()));

        Ok(Some(CurrentSummary {
            upload_id: record.upload_id,
            total_count: rows.len(),
            avg_flowrate: record.avg_flowrate,
            avg_pressure: record.avg_pressure,
            avg_temperature: record.avg_temperature,
            type_distribution,
        }))
    }

    /// 摘要响应（带无数据提示）
    pub fn summary_response(&self, user: &User) -> ApiResult<SummaryResponse> {
        Ok(self.summary_for_current(user)?.into())
    }

    /// 最近的上传历史（按上传时间倒序，最多 HISTORY_LIMIT 条）
    pub fn history(&self, user: &User) -> ApiResult<Vec<UploadHistoryEntry>> {
        Ok(self.upload_repo.history(user.user_id, HISTORY_LIMIT)?)
    }
}
