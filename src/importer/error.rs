// ==========================================
// ChemLizer - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 约束: 四类校验错误均在落库之前检出，出现时存储保持不变
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("CSV 格式无效: {0}")]
    FormatError(String),

    #[error("缺少必需列: {}", .missing.join(", "))]
    SchemaError { missing: Vec<String> },

    #[error("CSV 文件为空（无数据行）")]
    EmptyInputError,

    // ===== 类型转换错误 =====
    #[error("列 '{column}' 必须为数值（第 {row} 行: {value:?}）")]
    TypeCoercionError {
        column: String,
        row: usize,
        value: String,
    },

    // ===== 落库阶段错误 =====
    #[error("上传落库失败: {0}")]
    PersistenceError(String),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),
}

impl ImportError {
    /// 是否为输入校验错误（调用方应修正文件，而非重试）
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ImportError::FormatError(_)
                | ImportError::SchemaError { .. }
                | ImportError::EmptyInputError
                | ImportError::TypeCoercionError { .. }
        )
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        match err.kind() {
            csv::ErrorKind::Io(_) => ImportError::InternalError(err.to_string()),
            _ => ImportError::FormatError(err.to_string()),
        }
    }
}

// 实现 From<RepositoryError>
impl From<crate::repository::RepositoryError> for ImportError {
    fn from(err: crate::repository::RepositoryError) -> Self {
        ImportError::PersistenceError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_lists_every_missing_column() {
        let err = ImportError::SchemaError {
            missing: vec!["Flowrate".to_string(), "Temperature".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("Flowrate"));
        assert!(msg.contains("Temperature"));
    }

    #[test]
    fn test_validation_classification() {
        assert!(ImportError::EmptyInputError.is_validation());
        assert!(ImportError::FormatError("x".into()).is_validation());
        assert!(!ImportError::PersistenceError("disk".into()).is_validation());
        assert!(!ImportError::InternalError("x".into()).is_validation());
    }
}
