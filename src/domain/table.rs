// ==========================================
// 线索工具 - 表格结构
// ==========================================
// 职责: 动态列的内存表（列名 → 值），所有管道阶段共享
// 红线: 列按名称访问，不假设固定列位置
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// Row - 单行记录
// ==========================================
// 缺失值 = 不存在该键（空字符串同样视为缺失）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    values: HashMap<String, String>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// 读取单元格（缺失返回 None）
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(|v| v.as_str())
    }

    /// 写入单元格；None 或空串表示缺失
    pub fn set(&mut self, column: &str, value: Option<String>) {
        match value {
            Some(v) if !v.is_empty() => {
                self.values.insert(column.to_string(), v);
            }
            _ => {
                self.values.remove(column);
            }
        }
    }

    pub fn remove(&mut self, column: &str) -> Option<String> {
        self.values.remove(column)
    }

    pub fn rename(&mut self, from: &str, to: &str) {
        if let Some(v) = self.values.remove(from) {
            self.values.insert(to.to_string(), v);
        }
    }

    /// 是否所有单元格均缺失
    pub fn is_blank(&self) -> bool {
        self.values.is_empty()
    }
}

impl<const N: usize> From<[(&str, &str); N]> for Row {
    fn from(cells: [(&str, &str); N]) -> Self {
        let mut row = Row::new();
        for (k, v) in cells {
            row.set(k, Some(v.to_string()));
        }
        row
    }
}

// ==========================================
// Table - 有序行序列
// ==========================================
// 行顺序有业务含义: 去重"首次出现优先"、预览截断
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn with_rows(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut Vec<Row> {
        &mut self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn push_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// 追加列（已存在则忽略）
    pub fn add_column(&mut self, column: &str) {
        if !self.has_column(column) {
            self.columns.push(column.to_string());
        }
    }

    /// 为所有行写入同一个值（不存在则追加列）
    pub fn fill_column(&mut self, column: &str, value: &str) {
        self.add_column(column);
        for row in &mut self.rows {
            row.set(column, Some(value.to_string()));
        }
    }

    /// 删除列及其所有单元格
    pub fn drop_columns(&mut self, columns: &[String]) {
        self.columns.retain(|c| !columns.contains(c));
        for row in &mut self.rows {
            for c in columns {
                row.remove(c);
            }
        }
    }

    /// 列改名；目标列已存在时不改名，返回 false
    pub fn rename_column(&mut self, from: &str, to: &str) -> bool {
        if !self.has_column(from) || self.has_column(to) {
            return false;
        }
        for c in &mut self.columns {
            if c == from {
                *c = to.to_string();
            }
        }
        for row in &mut self.rows {
            row.rename(from, to);
        }
        true
    }

    /// 按允许列表收窄，输出列顺序与允许列表一致
    pub fn retain_columns(&mut self, allowed: &[&str]) {
        let kept: Vec<String> = allowed
            .iter()
            .filter(|a| self.has_column(a))
            .map(|a| a.to_string())
            .collect();
        let dropped: Vec<String> = self
            .columns
            .iter()
            .filter(|c| !kept.contains(c))
            .cloned()
            .collect();
        for row in &mut self.rows {
            for c in &dropped {
                row.remove(c);
            }
        }
        self.columns = kept;
    }

    pub fn retain_rows<F: FnMut(&Row) -> bool>(&mut self, f: F) {
        self.rows.retain(f);
    }

    /// 列是否"整体缺失"（列不存在，或所有行都为空）
    pub fn column_is_blank(&self, column: &str) -> bool {
        !self.has_column(column) || self.rows.iter().all(|r| r.get(column).is_none())
    }

    /// 前 n 行（预览）
    pub fn head(&self, n: usize) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// 纵向拼接，保持输入顺序；列集合取并集（按首次出现顺序）
    pub fn concat(tables: Vec<Table>) -> Table {
        let mut merged = Table::default();
        for table in tables {
            for c in &table.columns {
                merged.add_column(c);
            }
            merged.rows.extend(table.rows);
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::with_rows(
            vec!["title".into(), "address".into(), "junk".into()],
            vec![
                Row::from([("title", "A"), ("address", "X"), ("junk", "1")]),
                Row::from([("title", "B"), ("junk", "2")]),
            ],
        )
    }

    #[test]
    fn test_row_set_empty_is_absent() {
        let mut row = Row::new();
        row.set("a", Some(String::new()));
        assert_eq!(row.get("a"), None);
        assert!(row.is_blank());
    }

    #[test]
    fn test_rename_and_retain() {
        let mut t = sample();
        assert!(t.rename_column("title", "Название"));
        t.retain_columns(&["Название", "Адрес"]);
        assert_eq!(t.columns(), &["Название".to_string()]);
        assert_eq!(t.rows()[0].get("Название"), Some("A"));
        assert_eq!(t.rows()[0].get("junk"), None);
    }

    #[test]
    fn test_rename_refuses_existing_target() {
        let mut t = sample();
        assert!(!t.rename_column("title", "address"));
        assert!(t.has_column("title"));
    }

    #[test]
    fn test_column_is_blank() {
        let t = sample();
        assert!(!t.column_is_blank("address"));
        assert!(t.column_is_blank("missing"));
    }

    #[test]
    fn test_concat_preserves_order() {
        let a = sample();
        let b = Table::with_rows(vec!["other".into()], vec![Row::from([("other", "z")])]);
        let merged = Table::concat(vec![a, b]);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged.columns().last().map(|s| s.as_str()), Some("other"));
        assert_eq!(merged.rows()[2].get("other"), Some("z"));
        assert_eq!(merged.head(1).len(), 1);
    }
}
