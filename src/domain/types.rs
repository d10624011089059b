// ==========================================
// ChemLizer - 领域类型定义
// ==========================================
// CSV 列名与数值字段的统一定义，导入层/统计层/报表层共用
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 设备名称列
pub const COLUMN_EQUIPMENT_NAME: &str = "Equipment Name";
/// 设备类型列
pub const COLUMN_TYPE: &str = "Type";
/// 流量列
pub const COLUMN_FLOWRATE: &str = "Flowrate";
/// 压力列
pub const COLUMN_PRESSURE: &str = "Pressure";
/// 温度列
pub const COLUMN_TEMPERATURE: &str = "Temperature";

/// 必需列（顺序即缺失列报告顺序）
pub const REQUIRED_COLUMNS: [&str; 5] = [
    COLUMN_EQUIPMENT_NAME,
    COLUMN_TYPE,
    COLUMN_FLOWRATE,
    COLUMN_PRESSURE,
    COLUMN_TEMPERATURE,
];

// ==========================================
// 数值字段 (Numeric Field)
// ==========================================
// 三个必填测量值，不做单位换算
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumericField {
    Flowrate,
    Pressure,
    Temperature,
}

impl NumericField {
    /// 按列校验顺序排列
    pub const ALL: [NumericField; 3] = [
        NumericField::Flowrate,
        NumericField::Pressure,
        NumericField::Temperature,
    ];

    /// 对应的 CSV 列名
    pub fn column_name(&self) -> &'static str {
        match self {
            NumericField::Flowrate => COLUMN_FLOWRATE,
            NumericField::Pressure => COLUMN_PRESSURE,
            NumericField::Temperature => COLUMN_TEMPERATURE,
        }
    }
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column_name())
    }
}
