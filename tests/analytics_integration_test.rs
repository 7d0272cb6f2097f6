// ==========================================
// 集成测试 - CRM 转化分析
// ==========================================
// 测试目标: 分号/逗号导出均可加载，只统计本工具生成的线索
// ==========================================

mod test_helpers;

use lead_instrument::analytics::CrmAnalytics;
use lead_instrument::api::AnalyticsApi;
use tempfile::TempDir;
use test_helpers::write_file;

#[test]
fn test_metrics_from_semicolon_exports() {
    let dir = TempDir::new().unwrap();
    let leads = write_file(
        dir.path(),
        "LEAD.csv",
        "ID;Название лида;Стадия;Причина отказа;Источник телефона;Ответственный\n\
         1;A;Некачественный лид;Дорого;a.csv;Иван\n\
         2;B;Некачественный лид;Дорого;a.csv;Анна\n\
         3;C;Некачественный лид;Не отвечает;b.CSV;Анна\n\
         4;D;Некачественный лид;Дорого;ручной ввод;Анна\n",
    );
    let deals = write_file(
        dir.path(),
        "DEAL.csv",
        "ID;Название сделки;Стадия сделки;Ответственный;Сумма;Источник телефона\n\
         1;X;Сделка успешна (won);Анна;1000;a.csv\n\
         2;Y;Переговоры;Анна;500;a.csv\n\
         3;Z;Переговоры;Иван;500;b.csv\n\
         4;W;Переговоры;Пётр;500;b.csv\n",
    );

    let mut analytics = CrmAnalytics::load_exports(&leads, &deals);
    assert_eq!(analytics.leads().len(), 4);
    analytics.filter_own_leads();
    assert_eq!(analytics.leads().len(), 3);

    let metrics = analytics.calculate_metrics().clone();
    assert_eq!(metrics.total_leads, 7);
    assert_eq!(metrics.total_deals, 4);
    assert_eq!(metrics.successful_deals, 1);
    assert_eq!(metrics.total_rejections, 3);
    assert_eq!(metrics.rejection_reasons[0], ("Дорого".to_string(), 2));
    // (4 + 1) / 7 * 100
    assert_eq!(metrics.conversion, 71.43);
    assert_eq!(metrics.top_managers[0], ("Анна".to_string(), 2));
    assert_eq!(metrics.top_managers.len(), 3);
}

#[test]
fn test_missing_deal_export_counts_leads_only() {
    let dir = TempDir::new().unwrap();
    let leads = write_file(
        dir.path(),
        "LEAD.csv",
        "ID,Название,Стадия,Причина отказа,Источник телефона,Комментарий\n\
         1,A,Отказ,Дорого,a.csv,\n",
    );

    let api = AnalyticsApi::new(dir.path().join("reports"));
    let report = api.analyze(&leads, &dir.path().join("DEAL.csv"));
    assert_eq!(report.metrics.total_leads, 1);
    assert_eq!(report.metrics.total_deals, 0);
    assert_eq!(report.metrics.conversion, 0.0);
    assert!(report.summary.contains("Конверсия: 0%"));
}
