// ==========================================
// 线索工具 - 列对齐器实现
// ==========================================
// 职责: 多电话列 → phone_1 / phone_2；别名改名；允许列表收窄；无电话行过滤
// 红线: 按列名访问，不依赖列位置
// ==========================================

use crate::domain::lead::columns;
use crate::domain::table::Table;
use crate::importer::lead_importer_trait::ColumnReconciler;
use crate::importer::phone_validator::{is_null_like, PhoneValidator};
use tracing::{debug, error, info, warn};

/// 电话列名标记（小写子串匹配）
const PHONE_MARKERS: [&str; 2] = ["phone", "телефон"];

pub struct LeadColumnReconciler {
    validator: PhoneValidator,
}

impl LeadColumnReconciler {
    pub fn new(validator: PhoneValidator) -> Self {
        Self { validator }
    }

    /// 单行电话提取: 按列顺序扫描，逗号拆分，校验，行内去重
    fn collect_row_phones<'a>(
        &self,
        cells: impl Iterator<Item = Option<&'a str>>,
    ) -> Vec<String> {
        let mut phones: Vec<String> = Vec::new();
        for cell in cells.flatten() {
            if is_null_like(cell) {
                continue;
            }
            for part in cell.split(',') {
                if let Some(phone) = self.validator.clean(Some(part.trim())) {
                    if !phones.contains(&phone) {
                        phones.push(phone);
                    }
                }
            }
        }
        phones
    }
}

impl Default for LeadColumnReconciler {
    fn default() -> Self {
        Self::new(PhoneValidator::default())
    }
}

impl ColumnReconciler for LeadColumnReconciler {
    fn phone_columns(&self, table: &Table) -> Vec<String> {
        table
            .columns()
            .iter()
            .filter(|c| {
                let lower = c.to_lowercase();
                PHONE_MARKERS.iter().any(|m| lower.contains(m))
            })
            .cloned()
            .collect()
    }

    fn extract_phones(&self, table: &mut Table) {
        // 单列表 = 分隔符判断错误，照常继续但不提取
        if table.columns().len() == 1 {
            error!(
                column = %table.columns()[0].chars().take(100).collect::<String>(),
                "文件被读成单列，分隔符识别可能错误"
            );
            table.add_column(columns::PHONE_1);
            table.add_column(columns::PHONE_2);
            return;
        }

        let phone_columns = self.phone_columns(table);
        if phone_columns.is_empty() {
            warn!("未找到电话列");
            table.add_column(columns::PHONE_1);
            table.add_column(columns::PHONE_2);
            return;
        }
        debug!(count = phone_columns.len(), columns = ?phone_columns, "识别到电话列");

        let extracted: Vec<Vec<String>> = table
            .rows()
            .iter()
            .map(|row| self.collect_row_phones(phone_columns.iter().map(|c| row.get(c))))
            .collect();

        // 先删原电话列，再写计算列（原文件可能已有同名 phone_1）
        table.drop_columns(&phone_columns);
        table.add_column(columns::PHONE_1);
        table.add_column(columns::PHONE_2);

        let mut slot_1 = 0usize;
        let mut slot_2 = 0usize;
        for (row, mut phones) in table.rows_mut().iter_mut().zip(extracted) {
            phones.truncate(2);
            let mut phones = phones.into_iter();
            let first = phones.next();
            let second = phones.next();
            slot_1 += usize::from(first.is_some());
            slot_2 += usize::from(second.is_some());
            row.set(columns::PHONE_1, first);
            row.set(columns::PHONE_2, second);
        }

        info!(phone_1 = slot_1, phone_2 = slot_2, "电话提取完成");
    }

    fn narrow_columns(&self, table: &mut Table) {
        let mut renamed = Vec::new();
        for (from, to) in columns::RENAMES {
            if table.rename_column(from, to) {
                renamed.push(from);
            }
        }
        if !renamed.is_empty() {
            debug!(columns = ?renamed, "列已改名");
        }

        table.retain_columns(&columns::KEEP);
        debug!(kept = table.columns().len(), allowed = columns::KEEP.len(), "列已收窄");
    }

    fn drop_rows_without_phone(&self, table: &mut Table) -> usize {
        let before = table.len();
        table.retain_rows(|row| {
            row.get(columns::PHONE_1).is_some() || row.get(columns::PHONE_2).is_some()
        });
        before - table.len()
    }
}
