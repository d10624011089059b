// ==========================================
// ChemLizer - 设备报表渲染
// ==========================================
// 输入: 当前上传记录 + 其设备行（只消费查询结果）
// 输出: 分页文本文档（标题区 + 元数据区 + 设备表）
// 格式: 数值统一保留 2 位小数，上传时间 %Y-%m-%d %H:%M
// ==========================================

use crate::domain::equipment::{EquipmentRow, UploadRecord};
use crate::domain::types::REQUIRED_COLUMNS;
use serde::Serialize;
use std::fmt::Write as _;

/// 报表标题
pub const REPORT_TITLE: &str = "ChemLizer Equipment Report";

/// 报表文件名（包含上传 ID）
pub fn report_filename(upload_id: i64) -> String {
    format!("chemlizer_report_{}.txt", upload_id)
}

/// 单页设备表
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportPage {
    pub page_number: usize,
    pub rows: Vec<[String; 5]>,
}

/// 分页报表文档
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportDocument {
    pub filename: String,
    pub title: String,
    /// (标签, 值)，顺序即输出顺序
    pub metadata: Vec<(String, String)>,
    pub header: [String; 5],
    pub pages: Vec<ReportPage>,
}

impl ReportDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// 渲染为纯文本，页与页之间以换页符分隔
    pub fn render_text(&self) -> String {
        let widths = self.column_widths();
        let total_pages = self.pages.len();
        let mut out = String::new();

        for (idx, page) in self.pages.iter().enumerate() {
            if idx > 0 {
                out.push('\u{c}');
                out.push('\n');
            }

            // 标题与元数据只出现在首页
            if idx == 0 {
                let _ = writeln!(out, "{}", self.title);
                let _ = writeln!(out, "{}", "=".repeat(self.title.chars().count()));
                out.push('\n');
                for (label, value) in &self.metadata {
                    let _ = writeln!(out, "{}: {}", label, value);
                }
                out.push('\n');
            }

            let _ = writeln!(out, "{}", format_line(&self.header, &widths));
            let _ = writeln!(out, "{}", separator(&widths));
            for row in &page.rows {
                let _ = writeln!(out, "{}", format_line(row, &widths));
            }
            out.push('\n');
            let _ = writeln!(out, "Page {}/{}", page.page_number, total_pages);
        }

        out
    }

    fn column_widths(&self) -> [usize; 5] {
        let mut widths = [0usize; 5];
        let all_rows = std::iter::once(&self.header).chain(self.pages.iter().flat_map(|p| p.rows.iter()));
        for row in all_rows {
            for (w, cell) in widths.iter_mut().zip(row.iter()) {
                *w = (*w).max(cell.chars().count());
            }
        }
        widths
    }
}

fn format_line(cells: &[String; 5], widths: &[usize; 5]) -> String {
    cells
        .iter()
        .zip(widths.iter())
        .map(|(cell, w)| format!("{:^width$}", cell, width = *w))
        .collect::<Vec<_>>()
        .join(" | ")
}

fn separator(widths: &[usize; 5]) -> String {
    widths
        .iter()
        .map(|w| "-".repeat(*w))
        .collect::<Vec<_>>()
        .join("-+-")
}

// ==========================================
// ReportRenderer
// ==========================================
pub struct ReportRenderer {
    rows_per_page: usize,
}

impl ReportRenderer {
    pub fn new(rows_per_page: usize) -> Self {
        Self {
            rows_per_page: rows_per_page.max(1),
        }
    }

    /// 生成报表文档
    ///
    /// 元数据中的平均值取上传记录的存储值
    pub fn render(&self, record: &UploadRecord, rows: &[EquipmentRow]) -> ReportDocument {
        let metadata = vec![
            (
                "Upload Date".to_string(),
                record.uploaded_at.format("%Y-%m-%d %H:%M").to_string(),
            ),
            ("File".to_string(), record.filename.clone()),
            ("Total Records".to_string(), record.num_records.to_string()),
            ("Average Flowrate".to_string(), format!("{:.2}", record.avg_flowrate)),
            ("Average Pressure".to_string(), format!("{:.2}", record.avg_pressure)),
            (
                "Average Temperature".to_string(),
                format!("{:.2}", record.avg_temperature),
            ),
        ];

        let table_rows: Vec<[String; 5]> = rows
            .iter()
            .map(|r| {
                [
                    r.equipment_name.clone(),
                    r.equipment_type.clone(),
                    format!("{:.2}", r.flowrate),
                    format!("{:.2}", r.pressure),
                    format!("{:.2}", r.temperature),
                ]
            })
            .collect();

        let mut pages: Vec<ReportPage> = table_rows
            .chunks(self.rows_per_page)
            .enumerate()
            .map(|(idx, chunk)| ReportPage {
                page_number: idx + 1,
                rows: chunk.to_vec(),
            })
            .collect();
        if pages.is_empty() {
            pages.push(ReportPage {
                page_number: 1,
                rows: Vec::new(),
            });
        }

        ReportDocument {
            filename: report_filename(record.upload_id),
            title: REPORT_TITLE.to_string(),
            metadata,
            header: REQUIRED_COLUMNS.map(|c| c.to_string()),
            pages,
        }
    }
}
