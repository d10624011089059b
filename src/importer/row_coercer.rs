// ==========================================
// ChemLizer - 行类型转换器
// ==========================================
// 阶段 1: 文本单元格 → 类型化设备记录
// 规则:
// - 数值列按整列校验：任一单元格非数值即整列拒绝
// - 名称/类型列原样保留，不做清洗
// - 不丢行、不补默认值，行顺序与源文件一致
// ==========================================

use crate::domain::equipment::EquipmentRecord;
use crate::domain::types::{NumericField, COLUMN_EQUIPMENT_NAME, COLUMN_TYPE};
use crate::importer::equipment_importer_trait::RowCoercer;
use crate::importer::error::ImportError;
use crate::importer::schema_validator::ValidatedTable;
use serde::Serialize;

// ==========================================
// CoercionFailure - 整列转换失败
// ==========================================
// 记录第一处非法值，供错误信息定位
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoercionFailure {
    pub field: NumericField,
    /// 数据行号（1 起，不含表头）
    pub row_number: usize,
    pub raw_value: String,
}

impl From<CoercionFailure> for ImportError {
    fn from(failure: CoercionFailure) -> Self {
        ImportError::TypeCoercionError {
            column: failure.field.column_name().to_string(),
            row: failure.row_number,
            value: failure.raw_value,
        }
    }
}

/// 解析单个数值单元格（允许首尾空白，拒绝 NaN/inf）
pub fn parse_numeric_cell(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

// ==========================================
// EquipmentRowCoercer 实现
// ==========================================
pub struct EquipmentRowCoercer;

impl EquipmentRowCoercer {
    /// 整列转换：成功返回该列全部数值，失败返回首个非法单元格
    fn coerce_column(
        table: &ValidatedTable,
        field: NumericField,
    ) -> Result<Vec<f64>, CoercionFailure> {
        let column = field.column_name();
        (0..table.row_count())
            .map(|idx| {
                let raw = table.cell(idx, column).unwrap_or_default();
                parse_numeric_cell(raw).ok_or_else(|| CoercionFailure {
                    field,
                    row_number: idx + 1,
                    raw_value: raw.to_string(),
                })
            })
            .collect()
    }
}

impl RowCoercer for EquipmentRowCoercer {
    fn coerce(&self, table: &ValidatedTable) -> Result<Vec<EquipmentRecord>, CoercionFailure> {
        let flowrates = Self::coerce_column(table, NumericField::Flowrate)?;
        let pressures = Self::coerce_column(table, NumericField::Pressure)?;
        let temperatures = Self::coerce_column(table, NumericField::Temperature)?;

        let records = (0..table.row_count())
            .map(|idx| EquipmentRecord {
                name: table
                    .cell(idx, COLUMN_EQUIPMENT_NAME)
                    .unwrap_or_default()
                    .to_string(),
                equipment_type: table.cell(idx, COLUMN_TYPE).unwrap_or_default().to_string(),
                flowrate: flowrates[idx],
                pressure: pressures[idx],
                temperature: temperatures[idx],
            })
            .collect();

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::equipment_importer_trait::SchemaValidator;
    use crate::importer::schema_validator::CsvSchemaValidator;

    fn table(csv: &str) -> ValidatedTable {
        CsvSchemaValidator.validate(csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_coerce_preserves_order_and_text() {
        let t = table(
            "Equipment Name,Type,Flowrate,Pressure,Temperature\n\
             Pump-1,Pump,10,2.0,25\n\
             Valve-1,Valve, 5.5 ,1.5,-20\n",
        );
        let rows = EquipmentRowCoercer.coerce(&t).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Pump-1");
        assert_eq!(rows[0].flowrate, 10.0);
        assert_eq!(rows[1].equipment_type, "Valve");
        assert_eq!(rows[1].flowrate, 5.5);
        assert_eq!(rows[1].temperature, -20.0);
    }

    #[test]
    fn test_non_numeric_pressure_rejects_column() {
        let t = table(
            "Equipment Name,Type,Flowrate,Pressure,Temperature\n\
             Pump-1,Pump,10,2.0,25\n\
             Valve-1,Valve,5,high,20\n",
        );
        let failure = EquipmentRowCoercer.coerce(&t).unwrap_err();

        assert_eq!(failure.field, NumericField::Pressure);
        assert_eq!(failure.row_number, 2);
        assert_eq!(failure.raw_value, "high");

        let err: ImportError = failure.into();
        assert!(err.to_string().contains("Pressure"));
    }

    #[test]
    fn test_first_failing_column_reported_in_field_order() {
        let t = table(
            "Equipment Name,Type,Flowrate,Pressure,Temperature\n\
             Pump-1,Pump,10,2.0,hot\n\
             Valve-1,Valve,fast,1.5,20\n",
        );
        let failure = EquipmentRowCoercer.coerce(&t).unwrap_err();
        assert_eq!(failure.field, NumericField::Flowrate);
    }

    #[test]
    fn test_empty_numeric_cell_rejected() {
        let t = table("Equipment Name,Type,Flowrate,Pressure,Temperature\nP,Pump,,1,2\n");
        let failure = EquipmentRowCoercer.coerce(&t).unwrap_err();
        assert_eq!(failure.field, NumericField::Flowrate);
        assert_eq!(failure.raw_value, "");
    }

    #[test]
    fn test_parse_numeric_cell() {
        assert_eq!(parse_numeric_cell("1e3"), Some(1000.0));
        assert_eq!(parse_numeric_cell(" 2.5 "), Some(2.5));
        assert_eq!(parse_numeric_cell("NaN"), None);
        assert_eq!(parse_numeric_cell("inf"), None);
        assert_eq!(parse_numeric_cell("12 bar"), None);
    }
}
