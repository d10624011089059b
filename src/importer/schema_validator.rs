// ==========================================
// ChemLizer - CSV 结构校验器
// ==========================================
// 阶段 0: 解析表头 + 必需列检查 + 空表检查
// 约束: 本阶段不解析任何单元格的值
// ==========================================

use crate::domain::types::{
    COLUMN_EQUIPMENT_NAME, COLUMN_FLOWRATE, COLUMN_PRESSURE, COLUMN_TEMPERATURE, COLUMN_TYPE,
    REQUIRED_COLUMNS,
};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::equipment_importer_trait::SchemaValidator;
use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

// ==========================================
// ColumnIndex - 必需列在源文件中的位置
// ==========================================
// 列顺序任意，多余列忽略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndex {
    pub equipment_name: usize,
    pub equipment_type: usize,
    pub flowrate: usize,
    pub pressure: usize,
    pub temperature: usize,
}

impl ColumnIndex {
    /// 按列名取位置（列名需为 REQUIRED_COLUMNS 之一）
    pub fn position_of(&self, column: &str) -> Option<usize> {
        match column {
            COLUMN_EQUIPMENT_NAME => Some(self.equipment_name),
            COLUMN_TYPE => Some(self.equipment_type),
            COLUMN_FLOWRATE => Some(self.flowrate),
            COLUMN_PRESSURE => Some(self.pressure),
            COLUMN_TEMPERATURE => Some(self.temperature),
            _ => None,
        }
    }
}

// ==========================================
// ValidatedTable - 已通过结构校验的表
// ==========================================
// 表头已规范化（去除首尾空白），数据行保持原始文本
#[derive(Debug, Clone)]
pub struct ValidatedTable {
    headers: Vec<String>,
    columns: ColumnIndex,
    records: Vec<StringRecord>,
}

impl ValidatedTable {
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn columns(&self) -> ColumnIndex {
        self.columns
    }

    pub fn records(&self) -> &[StringRecord] {
        &self.records
    }

    /// 数据行数（恒 >= 1）
    pub fn row_count(&self) -> usize {
        self.records.len()
    }

    /// 读取第 row_idx 行（0 起）指定列的原始文本
    pub fn cell(&self, row_idx: usize, column: &str) -> Option<&str> {
        let pos = self.columns.position_of(column)?;
        self.records.get(row_idx).and_then(|r| r.get(pos))
    }
}

/// 规范化表头单元格（去 BOM + 去首尾空白）
fn normalize_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_string()
}

// ==========================================
// CsvSchemaValidator 实现
// ==========================================
pub struct CsvSchemaValidator;

impl SchemaValidator for CsvSchemaValidator {
    fn validate(&self, bytes: &[u8]) -> ImportResult<ValidatedTable> {
        // 全空输入：无表头也无数据
        if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            return Err(ImportError::EmptyInputError);
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(false) // 行长度不一致视为格式错误
            .from_reader(bytes);

        let headers: Vec<String> = reader.headers()?.iter().map(normalize_header).collect();

        // 必需列检查：一次性列出全部缺失列
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|required| !headers.iter().any(|h| h == *required))
            .map(|s| s.to_string())
            .collect();
        if !missing.is_empty() {
            debug!(missing = ?missing, "必需列缺失");
            return Err(ImportError::SchemaError { missing });
        }

        // 同名列取第一次出现的位置
        let find = |name: &str| -> usize {
            headers.iter().position(|h| h == name).unwrap_or_default()
        };
        let columns = ColumnIndex {
            equipment_name: find(COLUMN_EQUIPMENT_NAME),
            equipment_type: find(COLUMN_TYPE),
            flowrate: find(COLUMN_FLOWRATE),
            pressure: find(COLUMN_PRESSURE),
            temperature: find(COLUMN_TEMPERATURE),
        };

        let records = reader
            .records()
            .collect::<Result<Vec<StringRecord>, csv::Error>>()?;

        if records.is_empty() {
            return Err(ImportError::EmptyInputError);
        }

        debug!(rows = records.len(), columns = headers.len(), "CSV 结构校验通过");

        Ok(ValidatedTable {
            headers,
            columns,
            records,
        })
    }
}
