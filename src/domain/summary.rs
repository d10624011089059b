// ==========================================
// ChemLizer - 统计摘要领域模型
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 类型分布：设备类型（区分大小写、原样比较）→ 出现次数
pub type TypeDistribution = BTreeMap<String, usize>;

// ==========================================
// SummaryStatistics - 统计引擎输出
// ==========================================
// 导入时写入 upload_record 的平均值取自此结构
// 所有浮点值均已保留 2 位小数（银行家舍入）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub total_count: usize,
    pub avg_flowrate: f64,
    pub avg_pressure: f64,
    pub avg_temperature: f64,
    pub min_flowrate: f64,
    pub max_flowrate: f64,
    pub min_pressure: f64,
    pub max_pressure: f64,
    pub min_temperature: f64,
    pub max_temperature: f64,
    pub type_distribution: TypeDistribution,
}

// ==========================================
// CurrentSummary - 当前上传的读时摘要
// ==========================================
// total_count / type_distribution: 按当前设备行实时计算
// avg_*: 取 upload_record 中导入时存储的值（不重算）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentSummary {
    pub upload_id: i64,
    pub total_count: usize,
    pub avg_flowrate: f64,
    pub avg_pressure: f64,
    pub avg_temperature: f64,
    pub type_distribution: TypeDistribution,
}
