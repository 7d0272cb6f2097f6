// ==========================================
// 线索工具 - CRM 转化分析
// ==========================================
// 输入: CRM 线索导出 (LEAD) + 交易导出 (DEAL)
// 流程: 加载 → 过滤本工具生成的线索 → 计算指标 → 文本报告
// 说明: 列名不固定，按关键词子串（不区分大小写）查找首个匹配列
// ==========================================

use crate::domain::table::Table;
use crate::importer::file_parser::{CsvParser, UniversalFileParser};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, instrument, warn};

/// 来源文件列的可能名称
const SOURCE_COLUMN_NAMES: [&str; 4] = [
    "Источник телефона",
    "Phone Source",
    "Lead Source File",
    "Source File",
];
const REJECTION_KEYWORDS: [&str; 3] = ["отказ", "причина", "reason"];
const STAGE_KEYWORDS: [&str; 2] = ["стадия", "stage"];
const MANAGER_KEYWORDS: [&str; 3] = ["ответственный", "responsible", "manager"];
const SUCCESS_KEYWORDS: [&str; 6] = ["успешно", "реализовано", "выигран", "won", "success", "closed"];
const TOP_MANAGERS: usize = 3;

// ==========================================
// CrmMetrics - 分析指标
// ==========================================
// 计数列表均按次数降序（同次数保持首次出现顺序）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrmMetrics {
    pub total_leads: usize,
    pub total_deals: usize,
    pub total_rejections: usize,
    pub rejection_reasons: Vec<(String, usize)>,
    pub deal_stages: Vec<(String, usize)>,
    pub successful_deals: usize,
    /// 百分比，保留两位小数
    pub conversion: f64,
    pub top_managers: Vec<(String, usize)>,
}

pub struct CrmAnalytics {
    leads: Table,
    deals: Table,
    metrics: CrmMetrics,
}

impl CrmAnalytics {
    pub fn from_tables(leads: Table, deals: Table) -> Self {
        Self {
            leads,
            deals,
            metrics: CrmMetrics::default(),
        }
    }

    /// 加载 CRM 导出；单个文件失败时按空表处理
    #[instrument(skip_all)]
    pub fn load_exports(lead_path: &Path, deal_path: &Path) -> Self {
        let parser = UniversalFileParser::new(CsvParser::for_crm_exports());
        let load = |kind: &str, path: &Path| match parser.parse(path) {
            Ok(table) => {
                info!(kind, rows = table.len(), columns = table.columns().len(), "CRM 导出已加载");
                table
            }
            Err(e) => {
                warn!(kind, file = %path.display(), error = %e, "CRM 导出加载失败，按空表处理");
                Table::default()
            }
        };

        Self::from_tables(load("LEAD", lead_path), load("DEAL", deal_path))
    }

    pub fn leads(&self) -> &Table {
        &self.leads
    }

    pub fn deals(&self) -> &Table {
        &self.deals
    }

    pub fn metrics(&self) -> &CrmMetrics {
        &self.metrics
    }

    /// 只保留来源列值含 ".csv" 的行；找不到来源列则不过滤
    pub fn filter_own_leads(&mut self) {
        for (kind, table) in [("LEAD", &mut self.leads), ("DEAL", &mut self.deals)] {
            let column = find_column(table, &SOURCE_COLUMN_NAMES);
            match column {
                Some(column) => {
                    let before = table.len();
                    table.retain_rows(|row| {
                        row.get(&column)
                            .map(|v| v.to_lowercase().contains(".csv"))
                            .unwrap_or(false)
                    });
                    info!(kind, column = %column, before, after = table.len(), "已过滤本工具线索");
                }
                None => warn!(kind, "未找到来源文件列，分析全部记录"),
            }
        }
    }

    /// 计算全部指标
    pub fn calculate_metrics(&mut self) -> &CrmMetrics {
        let mut metrics = CrmMetrics {
            total_leads: self.leads.len() + self.deals.len(),
            ..CrmMetrics::default()
        };

        if let Some(column) = find_column(&self.leads, &REJECTION_KEYWORDS) {
            metrics.rejection_reasons = value_counts(&self.leads, &column);
            metrics.total_rejections = metrics.rejection_reasons.iter().map(|(_, n)| n).sum();
        } else {
            warn!("未找到拒绝原因列");
        }

        if let Some(column) = find_column(&self.deals, &STAGE_KEYWORDS) {
            metrics.deal_stages = value_counts(&self.deals, &column);
            metrics.total_deals = self.deals.len();
            // 按关键词分别计数后求和: 命中多个关键词的阶段重复计入
            let stages: Vec<String> = self
                .deals
                .rows()
                .iter()
                .filter_map(|row| row.get(&column))
                .map(str::to_lowercase)
                .collect();
            metrics.successful_deals = SUCCESS_KEYWORDS
                .iter()
                .map(|k| stages.iter().filter(|s| s.contains(k)).count())
                .sum();
        } else {
            warn!("未找到交易阶段列");
        }

        metrics.conversion = conversion(metrics.total_deals, metrics.successful_deals, metrics.total_leads);

        if let Some(column) = find_column(&self.deals, &MANAGER_KEYWORDS) {
            let mut managers = value_counts(&self.deals, &column);
            managers.truncate(TOP_MANAGERS);
            metrics.top_managers = managers;
        }

        info!(
            total_leads = metrics.total_leads,
            total_deals = metrics.total_deals,
            successful = metrics.successful_deals,
            conversion = metrics.conversion,
            "CRM 指标计算完成"
        );

        self.metrics = metrics;
        &self.metrics
    }

    /// 文本报告
    pub fn report_summary(&self) -> String {
        let m = &self.metrics;
        let mut lines = vec![
            "=== ОТЧЁТ ПО ЛИДОГЕНЕРАЦИИ ===".to_string(),
            String::new(),
            "1. ОБЩАЯ СТАТИСТИКА".to_string(),
            format!("   - Всего записей: {}", m.total_leads),
            format!("   - В работе (DEAL): {} сделок", m.total_deals),
            format!("   - Отказы (LEAD): {} лидов", m.total_rejections),
            format!("   - Успешные продажи: {} сделок", m.successful_deals),
            format!("   - Конверсия: {}%", m.conversion),
            String::new(),
            "2. ПРИЧИНЫ ОТКАЗА".to_string(),
        ];

        if m.rejection_reasons.is_empty() {
            lines.push("   - Нет данных".to_string());
        }
        lines.extend(m.rejection_reasons.iter().map(|(reason, count)| {
            let share = *count as f64 / m.total_rejections.max(1) as f64 * 100.0;
            format!("   - {}: {} ({:.1}%)", reason, count, share)
        }));

        lines.push(String::new());
        lines.push("3. ТОП-МЕНЕДЖЕРЫ".to_string());
        if m.top_managers.is_empty() {
            lines.push("   - Нет данных".to_string());
        }
        lines.extend(
            m.top_managers
                .iter()
                .enumerate()
                .map(|(idx, (manager, count))| format!("   {}. {}: {} сделок", idx + 1, manager, count)),
        );

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

/// (交易数 + 成功数) / 总数 × 100，两位小数；总数为 0 时为 0
pub fn conversion(total_deals: usize, successful_deals: usize, total_leads: usize) -> f64 {
    if total_leads == 0 {
        return 0.0;
    }
    let pct = (total_deals + successful_deals) as f64 / total_leads as f64 * 100.0;
    (pct * 100.0).round() / 100.0
}

fn find_column(table: &Table, keywords: &[&str]) -> Option<String> {
    table
        .columns()
        .iter()
        .find(|c| {
            let lower = c.to_lowercase();
            keywords.iter().any(|k| lower.contains(&k.to_lowercase()))
        })
        .cloned()
}

/// 非空值计数，按次数降序；同次数保持首次出现顺序
fn value_counts(table: &Table, column: &str) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for value in table.rows().iter().filter_map(|r| r.get(column)) {
        match counts.iter_mut().find(|(v, _)| v == value) {
            Some((_, n)) => *n += 1,
            None => counts.push((value.to_string(), 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::table::Row;

    fn leads() -> Table {
        Table::with_rows(
            vec!["ID".into(), "Источник телефона".into(), "Причина отказа".into()],
            vec![
                Row::from([("ID", "1"), ("Источник телефона", "moscow.csv"), ("Причина отказа", "Дорого")]),
                Row::from([("ID", "2"), ("Источник телефона", "spb.CSV"), ("Причина отказа", "Дорого")]),
                Row::from([("ID", "3"), ("Источник телефона", "moscow.csv"), ("Причина отказа", "Нет ЛПР")]),
                Row::from([("ID", "4"), ("Источник телефона", "сайт")]),
            ],
        )
    }

    fn deals() -> Table {
        Table::with_rows(
            vec!["ID".into(), "Стадия сделки".into(), "Ответственный".into()],
            vec![
                Row::from([("ID", "1"), ("Стадия сделки", "Сделка успешна"), ("Ответственный", "Иван")]),
                Row::from([("ID", "2"), ("Стадия сделки", "Closed Won"), ("Ответственный", "Иван")]),
                Row::from([("ID", "3"), ("Стадия сделки", "Переговоры"), ("Ответственный", "Анна")]),
                Row::from([("ID", "4"), ("Стадия сделки", "Реализовано"), ("Ответственный", "Олег")]),
                Row::from([("ID", "5"), ("Стадия сделки", "Переговоры"), ("Ответственный", "Пётр")]),
            ],
        )
    }

    #[test]
    fn test_filter_own_leads() {
        let mut analytics = CrmAnalytics::from_tables(leads(), deals());
        analytics.filter_own_leads();
        assert_eq!(analytics.leads().len(), 3);
        // DEAL 无来源列 → 不过滤
        assert_eq!(analytics.deals().len(), 5);
    }

    #[test]
    fn test_calculate_metrics() {
        let mut analytics = CrmAnalytics::from_tables(leads(), deals());
        analytics.filter_own_leads();
        let metrics = analytics.calculate_metrics().clone();

        assert_eq!(metrics.total_leads, 8);
        assert_eq!(metrics.total_deals, 5);
        assert_eq!(metrics.total_rejections, 3);
        assert_eq!(metrics.rejection_reasons[0], ("Дорого".to_string(), 2));
        // "успешна" 不含 "успешно"；"Closed Won" 命中 won 与 closed，计两次
        assert_eq!(metrics.successful_deals, 3);
        assert_eq!(metrics.conversion, 100.0);
        assert_eq!(metrics.top_managers.len(), 3);
        assert_eq!(metrics.top_managers[0], ("Иван".to_string(), 2));
        assert_eq!(metrics.deal_stages[0], ("Переговоры".to_string(), 2));
    }

    #[test]
    fn test_stage_matching_two_keywords_counts_twice() {
        let deals = Table::with_rows(
            vec!["Стадия".into()],
            vec![Row::from([("Стадия", "Closed Won")])],
        );
        let mut analytics = CrmAnalytics::from_tables(Table::default(), deals);
        let metrics = analytics.calculate_metrics();

        assert_eq!(metrics.successful_deals, 2);
        assert_eq!(metrics.conversion, 300.0);
    }

    #[test]
    fn test_conversion_rounding_and_empty() {
        assert_eq!(conversion(1, 0, 3), 33.33);
        assert_eq!(conversion(0, 0, 0), 0.0);
    }

    #[test]
    fn test_report_summary() {
        let mut analytics = CrmAnalytics::from_tables(leads(), deals());
        analytics.calculate_metrics();
        let report = analytics.report_summary();
        assert!(report.contains("Всего записей: 9"));
        assert!(report.contains("Дорого: 2 (66.7%)"));
        assert!(report.contains("1. Иван: 2 сделок"));
    }

    #[test]
    fn test_empty_tables() {
        let mut analytics = CrmAnalytics::from_tables(Table::default(), Table::default());
        let metrics = analytics.calculate_metrics();
        assert_eq!(metrics.conversion, 0.0);
        assert!(analytics.report_summary().contains("Нет данных"));
    }
}
