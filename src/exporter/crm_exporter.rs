// ==========================================
// 线索工具 - CRM 导出器
// ==========================================
// 流程: 按 source_file 分组（首次出现顺序）→ 逐组映射 → 拼接 → 写文件
// 说明: 负责人轮询在每个分组内重新开始
// ==========================================

use crate::domain::lead::{columns, CrmRecord};
use crate::domain::table::{Row, Table};
use crate::exporter::crm_mapper::CrmMapper;
use crate::exporter::crm_writer::CrmCsvWriter;
use crate::importer::error::ImportResult;
use std::path::Path;
use tracing::{info, instrument};

#[derive(Default)]
pub struct CrmExporter {
    mapper: CrmMapper,
    writer: CrmCsvWriter,
}

impl CrmExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 合并表 → CRM 记录（不写文件）
    pub fn build_records(&self, table: &Table, owners: &[String]) -> Vec<CrmRecord> {
        let mut records = Vec::with_capacity(table.len());
        for (source, group) in group_by_source(table) {
            let mapped = self.mapper.map_to_schema(&group, owners, &source);
            info!(source = %source, rows = mapped.len(), "来源分组已映射");
            records.extend(mapped);
        }
        records
    }

    /// 导出 CRM 导入文件
    ///
    /// # 返回
    /// - Ok(写出行数)
    #[instrument(skip(self, table, owners), fields(path = %output_path.display()))]
    pub fn export_for_crm(
        &self,
        table: &Table,
        owners: &[String],
        output_path: &Path,
    ) -> ImportResult<usize> {
        let records = self.build_records(table, owners);
        self.writer.write(&records, output_path)
    }
}

/// 按来源文件分组，保持首次出现顺序与组内行顺序
fn group_by_source(table: &Table) -> Vec<(String, Table)> {
    let mut groups: Vec<(String, Vec<Row>)> = Vec::new();
    for row in table.rows() {
        let source = row.get(columns::SOURCE_FILE).unwrap_or_default().to_string();
        match groups.iter_mut().find(|(s, _)| *s == source) {
            Some((_, rows)) => rows.push(row.clone()),
            None => groups.push((source, vec![row.clone()])),
        }
    }
    groups
        .into_iter()
        .map(|(source, rows)| (source, Table::with_rows(table.columns().to_vec(), rows)))
        .collect()
}
