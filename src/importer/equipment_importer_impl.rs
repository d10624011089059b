// ==========================================
// ChemLizer - 设备数据导入器实现
// ==========================================
// 职责: 整合导入流程，从文件到数据库
// 流程: 结构校验 → 类型转换 → 统计 → 落库 → 保留策略
// 约束: 前两步失败时不触碰存储（不落库、不执行保留策略）
// ==========================================

use crate::config::UploadConfigReader;
use crate::domain::equipment::{NewUpload, UploadOutcome};
use crate::domain::user::User;
use crate::engine::StatisticsEngine;
use crate::importer::equipment_importer_trait::{EquipmentImporter, RowCoercer, SchemaValidator};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::row_coercer::EquipmentRowCoercer;
use crate::importer::schema_validator::CsvSchemaValidator;
use crate::repository::UploadRepository;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

// ==========================================
// EquipmentImporterImpl - 设备数据导入器实现
// ==========================================
pub struct EquipmentImporterImpl<C>
where
    C: UploadConfigReader,
{
    // 数据访问层
    upload_repo: Arc<UploadRepository>,

    // 配置读取器
    config: C,

    // 导入组件
    schema_validator: Box<dyn SchemaValidator>,
    row_coercer: Box<dyn RowCoercer>,
}

impl<C> EquipmentImporterImpl<C>
where
    C: UploadConfigReader,
{
    /// 创建新的 EquipmentImporter 实例
    ///
    /// # 参数
    /// - upload_repo: 上传记录仓储
    /// - config: 配置读取器
    /// - schema_validator: 结构校验器
    /// - row_coercer: 行类型转换器
    pub fn new(
        upload_repo: Arc<UploadRepository>,
        config: C,
        schema_validator: Box<dyn SchemaValidator>,
        row_coercer: Box<dyn RowCoercer>,
    ) -> Self {
        Self {
            upload_repo,
            config,
            schema_validator,
            row_coercer,
        }
    }

    /// 使用默认 CSV 组件创建导入器
    pub fn with_default_components(upload_repo: Arc<UploadRepository>, config: C) -> Self {
        Self::new(
            upload_repo,
            config,
            Box::new(CsvSchemaValidator),
            Box::new(EquipmentRowCoercer),
        )
    }
}

#[async_trait::async_trait]
impl<C> EquipmentImporter for EquipmentImporterImpl<C>
where
    C: UploadConfigReader + Send + Sync,
{
    #[instrument(skip(self, user, bytes), fields(user_id = user.user_id, bytes = bytes.len()))]
    async fn import_bytes(
        &self,
        user: &User,
        filename: &str,
        bytes: &[u8],
    ) -> ImportResult<UploadOutcome> {
        let start_time = Instant::now();
        info!(filename = %filename, "开始导入设备数据");

        // === 步骤 1: 结构校验 ===
        debug!("步骤 1: 结构校验");
        let table = self.schema_validator.validate(bytes).map_err(|e| {
            warn!(error = %e, "结构校验失败");
            e
        })?;
        info!(rows = table.row_count(), "结构校验完成");

        // === 步骤 2: 类型转换 ===
        debug!("步骤 2: 类型转换");
        let records = self.row_coercer.coerce(&table).map_err(|failure| {
            warn!(
                column = %failure.field,
                row = failure.row_number,
                value = %failure.raw_value,
                "数值列转换失败"
            );
            ImportError::from(failure)
        })?;
        debug!(count = records.len(), "类型转换完成");

        // === 步骤 3: 统计 ===
        debug!("步骤 3: 统计");
        let summary = StatisticsEngine::summarize(&records).ok_or(ImportError::EmptyInputError)?;
        debug!(
            total = summary.total_count,
            avg_flowrate = summary.avg_flowrate,
            avg_pressure = summary.avg_pressure,
            avg_temperature = summary.avg_temperature,
            "统计完成"
        );

        // 保留数量在落库前读取，配置异常不会留下未清理的上传
        let keep_count = self
            .config
            .get_retention_keep_count()
            .map_err(|e| ImportError::InternalError(format!("读取保留配置失败: {}", e)))?;

        // === 步骤 4: 落库（事务化）===
        debug!("步骤 4: 落库");
        let new_upload = NewUpload {
            user_id: user.user_id,
            filename: filename.to_string(),
            num_records: summary.total_count as i64,
            avg_flowrate: summary.avg_flowrate,
            avg_pressure: summary.avg_pressure,
            avg_temperature: summary.avg_temperature,
            rows: records,
        };
        let upload_id = self.upload_repo.commit(&new_upload).map_err(|e| {
            error!(error = %e, "上传落库失败");
            ImportError::from(e)
        })?;
        info!(upload_id, "上传落库完成");

        // === 步骤 5: 保留策略 ===
        // 落库已成功：清理失败记录日志并在结果中标记，下次上传会再次清理
        debug!("步骤 5: 保留策略");
        let (retention_deleted, retention_failed) =
            match self.upload_repo.enforce_retention(user.user_id, keep_count) {
                Ok(n) => (n, false),
                Err(e) => {
                    error!(error = %e, keep_count, "保留策略执行失败");
                    (0, true)
                }
            };

        let elapsed = start_time.elapsed();
        info!(
            upload_id,
            total = summary.total_count,
            retention_deleted,
            retention_failed,
            elapsed_ms = elapsed.as_millis() as u64,
            "设备数据导入完成"
        );

        Ok(UploadOutcome {
            upload_id,
            filename: filename.to_string(),
            summary,
            retention_deleted,
            retention_failed,
            elapsed_ms: elapsed.as_millis() as u64,
        })
    }

    async fn import_from_csv<P: AsRef<Path> + Send>(
        &self,
        user: &User,
        file_path: P,
    ) -> ImportResult<UploadOutcome> {
        let path = file_path.as_ref();
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        let bytes = tokio::fs::read(path).await.map_err(|e| {
            error!(path = %path.display(), error = %e, "文件读取失败");
            ImportError::FileReadError(format!("{}: {}", path.display(), e))
        })?;

        self.import_bytes(user, &filename, &bytes).await
    }
}
