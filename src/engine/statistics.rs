// ==========================================
// ChemLizer - 统计引擎
// ==========================================
// 职责: 对已转换的设备行计算汇总统计
// 红线: 纯函数，无副作用；导入时与读取时共用同一实现
// 舍入: 保留 2 位小数，银行家舍入（round half to even）
// ==========================================

use crate::domain::equipment::EquipmentRecord;
use crate::domain::summary::{SummaryStatistics, TypeDistribution};
use crate::domain::types::NumericField;

/// 保留 2 位小数
///
/// 按输入的精确二进制值做十进制舍入（恰为 .xx5 时取偶），
/// 不先乘 100（乘法会先舍入一次，29.574999… 会变成 2957.5）
pub fn round2(value: f64) -> f64 {
    format!("{:.2}", value).parse::<f64>().unwrap_or(value)
}

/// 单个数值字段的均值/最小/最大（未舍入）
#[derive(Debug, Clone, Copy, PartialEq)]
struct FieldAggregate {
    mean: f64,
    min: f64,
    max: f64,
}

// ==========================================
// StatisticsEngine
// ==========================================
pub struct StatisticsEngine;

impl StatisticsEngine {
    /// 计算汇总统计
    ///
    /// # 返回
    /// - Some(SummaryStatistics): rows 非空
    /// - None: rows 为空（结构校验保证导入路径不会出现）
    pub fn summarize(rows: &[EquipmentRecord]) -> Option<SummaryStatistics> {
        if rows.is_empty() {
            return None;
        }

        let flowrate = Self::aggregate(rows, NumericField::Flowrate);
        let pressure = Self::aggregate(rows, NumericField::Pressure);
        let temperature = Self::aggregate(rows, NumericField::Temperature);

        Some(SummaryStatistics {
            total_count: rows.len(),
            avg_flowrate: round2(flowrate.mean),
            avg_pressure: round2(pressure.mean),
            avg_temperature: round2(temperature.mean),
            min_flowrate: round2(flowrate.min),
            max_flowrate: round2(flowrate.max),
            min_pressure: round2(pressure.min),
            max_pressure: round2(pressure.max),
            min_temperature: round2(temperature.min),
            max_temperature: round2(temperature.max),
            type_distribution: Self::type_distribution(
                rows.iter().map(|r| r.equipment_type.as_str()),
            ),
        })
    }

    /// 类型分布：每个不同类型（原样、区分大小写）的出现次数
    ///
    /// 读时摘要按已落库设备行调用同一函数
    pub fn type_distribution<'a, I>(types: I) -> TypeDistribution
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut distribution = TypeDistribution::new();
        for t in types {
            *distribution.entry(t.to_string()).or_insert(0) += 1;
        }
        distribution
    }

    fn aggregate(rows: &[EquipmentRecord], field: NumericField) -> FieldAggregate {
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for row in rows {
            let v = row.value(field);
            sum += v;
            min = min.min(v);
            max = max.max(v);
        }

        FieldAggregate {
            mean: sum / rows.len() as f64,
            min,
            max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, t: &str, f: f64, p: f64, temp: f64) -> EquipmentRecord {
        EquipmentRecord {
            name: name.to_string(),
            equipment_type: t.to_string(),
            flowrate: f,
            pressure: p,
            temperature: temp,
        }
    }

    #[test]
    fn test_pump_valve_scenario() {
        let rows = vec![
            record("Pump-1", "Pump", 10.0, 2.0, 25.0),
            record("Valve-1", "Valve", 5.0, 1.5, 20.0),
        ];
        let s = StatisticsEngine::summarize(&rows).unwrap();

        assert_eq!(s.total_count, 2);
        assert_eq!(s.avg_flowrate, 7.5);
        assert_eq!(s.avg_pressure, 1.75);
        assert_eq!(s.avg_temperature, 22.5);
        assert_eq!(s.min_flowrate, 5.0);
        assert_eq!(s.max_flowrate, 10.0);
        assert_eq!(s.min_temperature, 20.0);
        assert_eq!(s.max_pressure, 2.0);
        assert_eq!(s.type_distribution.get("Pump"), Some(&1));
        assert_eq!(s.type_distribution.get("Valve"), Some(&1));
        assert_eq!(s.type_distribution.len(), 2);
    }

    #[test]
    fn test_mean_is_rounded_to_two_decimals() {
        let rows = vec![
            record("A", "Pump", 1.0, 1.0, 1.0),
            record("B", "Pump", 1.0, 1.0, 1.0),
            record("C", "Pump", 2.0, 1.0, 1.0),
        ];
        let s = StatisticsEngine::summarize(&rows).unwrap();
        assert_eq!(s.avg_flowrate, 1.33);
    }

    #[test]
    fn test_type_distribution_is_case_sensitive() {
        let dist = StatisticsEngine::type_distribution(["Pump", "pump", "Pump", "Valve"]);
        assert_eq!(dist.get("Pump"), Some(&2));
        assert_eq!(dist.get("pump"), Some(&1));
        assert_eq!(dist.values().sum::<usize>(), 4);
    }

    #[test]
    fn test_empty_rows_have_no_summary() {
        assert!(StatisticsEngine::summarize(&[]).is_none());
    }

    #[test]
    fn test_round2_half_even() {
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(-0.625), -0.62);
        assert_eq!(round2(7.5), 7.5);
    }

    #[test]
    fn test_round2_uses_exact_input_value() {
        // 这些字面量的二进制值略小于 .xx5
        assert_eq!(round2(29.575), 29.57);
        assert_eq!(round2(763.775), 763.77);
        assert_eq!(round2(332.695), 332.69);
        assert_eq!(round2(1.0 / 3.0), 0.33);
        assert_eq!(round2(-2.0 / 3.0), -0.67);
    }

    #[test]
    fn test_stored_mean_uses_exact_rounding() {
        // 均值 29.575（二进制略小于 29.575）应舍为 29.57
        let rows = vec![
            record("A", "Pump", 29.575, 1.0, 1.0),
            record("B", "Pump", 29.575, 1.0, 1.0),
        ];
        let s = StatisticsEngine::summarize(&rows).unwrap();
        assert_eq!(s.avg_flowrate, 29.57);
        assert_eq!(s.max_flowrate, 29.57);
    }

    #[test]
    fn test_summarize_is_deterministic() {
        let rows = vec![
            record("A", "HX", 3.3333, 10.0, 80.0),
            record("B", "Reactor", 6.6667, 12.5, 150.0),
        ];
        assert_eq!(
            StatisticsEngine::summarize(&rows),
            StatisticsEngine::summarize(&rows)
        );
    }
}
