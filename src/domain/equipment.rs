// ==========================================
// ChemLizer - 设备与上传记录领域模型
// ==========================================
// 对齐: upload_record / equipment 表
// 红线: 上传记录与设备行同生同灭，创建后不修改
// ==========================================

use crate::domain::types::NumericField;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// EquipmentRecord - 导入中间结构体
// ==========================================
// 用途: 行转换器输出（文件行顺序保持不变）
// 生命周期: 仅在导入流程内
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub equipment_type: String,
    pub flowrate: f64,
    pub pressure: f64,
    pub temperature: f64,
}

impl EquipmentRecord {
    /// 读取指定数值字段
    pub fn value(&self, field: NumericField) -> f64 {
        match field {
            NumericField::Flowrate => self.flowrate,
            NumericField::Pressure => self.pressure,
            NumericField::Temperature => self.temperature,
        }
    }
}

// ==========================================
// UploadRecord - 上传记录
// ==========================================
// 排序: uploaded_at DESC, upload_id DESC（最近优先）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadRecord {
    pub upload_id: i64,
    pub user_id: i64,
    pub filename: String,
    pub uploaded_at: DateTime<Utc>,
    pub num_records: i64,
    pub avg_flowrate: f64,
    pub avg_pressure: f64,
    pub avg_temperature: f64,
    /// 预留统计位（暂无写入方）
    pub avg_reserved: Option<f64>,
}

// ==========================================
// EquipmentRow - 已落库设备行
// ==========================================
// 红线: 每行只属于一个 UploadRecord，不共享不迁移
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentRow {
    pub equipment_id: i64,
    pub upload_id: i64,
    pub equipment_name: String,
    pub equipment_type: String,
    pub flowrate: f64,
    pub pressure: f64,
    pub temperature: f64,
}

// ==========================================
// NewUpload - 待提交的上传
// ==========================================
// 用途: 导入管道 → UploadRepository::commit 的入参
#[derive(Debug, Clone)]
pub struct NewUpload {
    pub user_id: i64,
    pub filename: String,
    pub num_records: i64,
    pub avg_flowrate: f64,
    pub avg_pressure: f64,
    pub avg_temperature: f64,
    pub rows: Vec<EquipmentRecord>,
}

// ==========================================
// UploadHistoryEntry - 历史记录只读投影
// ==========================================
// 不携带设备行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadHistoryEntry {
    pub upload_id: i64,
    pub filename: String,
    pub username: String,
    pub uploaded_at: DateTime<Utc>,
    pub num_records: i64,
    pub avg_flowrate: f64,
    pub avg_pressure: f64,
    pub avg_temperature: f64,
}

// ==========================================
// UploadOutcome - 一次成功导入的结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadOutcome {
    pub upload_id: i64,
    pub filename: String,
    pub summary: crate::domain::summary::SummaryStatistics,
    /// 保留策略本次删除的旧上传数
    pub retention_deleted: usize,
    /// 保留策略执行失败（上传本身已落库，旧上传待下次清理）
    pub retention_failed: bool,
    pub elapsed_ms: u64,
}
