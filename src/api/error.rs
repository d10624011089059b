// ==========================================
// ChemLizer - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换导入/仓储错误为调用方可分辨的错误
// 分类: 校验失败（修正输入）/ 无数据（显式缺省）/ 认证失败 / 内部失败（稍后重试）
// ==========================================

use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入错误（调用方需修正输入）
    // ==========================================
    /// 上传内容校验失败，保留导入层的具体错误
    /// （FormatError / SchemaError / EmptyInputError / TypeCoercionError）
    #[error("数据验证失败: {0}")]
    ValidationError(#[source] ImportError),

    #[error("无效输入: {0}")]
    InvalidInput(String),

    // ==========================================
    // 显式缺省
    // ==========================================
    #[error("无可用数据: {0}")]
    NoData(String),

    // ==========================================
    // 认证错误
    // ==========================================
    #[error("认证失败: {0}")]
    AuthError(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("文件读写失败: {0}")]
    FileError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 是否为"修正输入后重试"类错误
    pub fn is_validation(&self) -> bool {
        matches!(self, ApiError::ValidationError(_) | ApiError::InvalidInput(_))
    }

    /// 校验失败时的导入层错误
    pub fn import_error(&self) -> Option<&ImportError> {
        match self {
            ApiError::ValidationError(err) => Some(err),
            _ => None,
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseTransactionError(msg)
            | RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::InvalidInput(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::DatabaseError(format!("外键约束违反: {}", msg))
            }
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("字段{}错误: {}", field, message))
            }
        }
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
// 校验类错误原样保留（缺失列清单、列名、行号可直接读取）
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        if err.is_validation() {
            return ApiError::ValidationError(err);
        }
        match err {
            ImportError::FileReadError(msg) => ApiError::FileError(msg),
            ImportError::PersistenceError(msg) => ApiError::DatabaseError(msg),
            other => ApiError::InternalError(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
