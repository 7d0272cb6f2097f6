// ==========================================
// 线索工具 - 重复处理器实现
// ==========================================
// 职责: 合并结果按 phone_1 去重，首次出现优先
// 说明: phone_1 缺失的行互不视为重复；phone_2 不参与比较
// ==========================================

use crate::domain::lead::columns;
use crate::domain::table::Table;
use crate::importer::lead_importer_trait::DuplicateHandler as DuplicateHandlerTrait;
use std::collections::HashSet;

pub struct DuplicateHandler;

impl DuplicateHandlerTrait for DuplicateHandler {
    fn detect_duplicates(&self, table: &Table) -> Vec<(usize, String)> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut duplicates = Vec::new();

        for (idx, row) in table.rows().iter().enumerate() {
            if let Some(phone) = row.get(columns::PHONE_1) {
                if !seen.insert(phone) {
                    duplicates.push((idx, phone.to_string()));
                }
            }
        }

        duplicates
    }

    fn remove_duplicates(&self, table: &mut Table) -> usize {
        let before = table.len();
        let mut seen: HashSet<String> = HashSet::new();
        table.retain_rows(|row| match row.get(columns::PHONE_1) {
            Some(phone) => seen.insert(phone.to_string()),
            None => true,
        });
        before - table.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::table::Row;

    fn merged() -> Table {
        Table::with_rows(
            vec!["phone_1".into(), "phone_2".into(), "source_file".into()],
            vec![
                Row::from([("phone_1", "79991234567"), ("source_file", "a.csv")]),
                Row::from([("phone_2", "79990000001"), ("source_file", "a.csv")]),
                Row::from([("phone_1", "79991234567"), ("source_file", "b.csv")]),
                Row::from([("phone_2", "79990000002"), ("source_file", "b.csv")]),
                Row::from([("phone_1", "79995554433"), ("phone_2", "79990000001")]),
            ],
        )
    }

    #[test]
    fn test_detect_duplicates() {
        let duplicates = DuplicateHandler.detect_duplicates(&merged());
        assert_eq!(duplicates, vec![(2, "79991234567".to_string())]);
    }

    #[test]
    fn test_remove_duplicates_keeps_first_occurrence() {
        let mut table = merged();
        let removed = DuplicateHandler.remove_duplicates(&mut table);

        assert_eq!(removed, 1);
        assert_eq!(table.len(), 4);
        assert_eq!(table.rows()[0].get("source_file"), Some("a.csv"));
    }

    #[test]
    fn test_rows_without_phone_1_are_not_duplicates() {
        let mut table = merged();
        DuplicateHandler.remove_duplicates(&mut table);
        let without_phone_1 = table
            .rows()
            .iter()
            .filter(|r| r.get("phone_1").is_none())
            .count();
        assert_eq!(without_phone_1, 2);
    }

    #[test]
    fn test_phone_2_collision_is_not_a_duplicate() {
        let mut table = merged();
        DuplicateHandler.remove_duplicates(&mut table);
        assert!(table
            .rows()
            .iter()
            .any(|r| r.get("phone_1") == Some("79995554433")));
    }
}
