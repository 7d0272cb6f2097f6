// ==========================================
// 端到端集成测试 - 线索处理完整流程
// ==========================================
// 测试目标: 源文件 → 电话标准化 → 合并去重 → CRM 导出 → 运行历史
// 覆盖范围: LeadImporterImpl + CrmExporter + LeadApi
// ==========================================

mod test_helpers;

use lead_instrument::api::LeadApi;
use lead_instrument::domain::lead::CRM_COLUMNS;
use lead_instrument::domain::types::RunStatus;
use lead_instrument::exporter::CrmExporter;
use lead_instrument::importer::{LeadImporter, LeadImporterImpl};
use lead_instrument::logging;
use tempfile::TempDir;
use test_helpers::{create_test_config, create_test_db, read_crm_export, write_file};

#[test]
fn test_shared_phone_across_files_is_deduplicated() {
    logging::init_test();
    let dir = TempDir::new().unwrap();
    let a = write_file(dir.path(), "a.csv", "title,phone,address\nКафе Ромашка,89991234567,Ленина 1\n");
    let b = write_file(dir.path(), "b.csv", "title,phone,address\nКафе Лютик,79991234567,Мира 2\n");

    let mut importer = LeadImporterImpl::default();
    let merged = importer.merge_files(&[&a, &b]).unwrap();
    let stats = importer.statistics();

    assert_eq!(merged.len(), 1);
    assert_eq!(stats.valid_rows, 1);
    assert_eq!(stats.duplicates_removed, 1);
    assert_eq!(stats.total_rows, 2);
    assert_eq!(stats.files_processed, 2);
    assert_eq!(merged.rows()[0].get("phone_1"), Some("79991234567"));
    assert_eq!(merged.rows()[0].get("source_file"), Some("a.csv"));

    let out = dir.path().join("crm.csv");
    let written = CrmExporter::new()
        .export_for_crm(&merged, &["Иван".to_string()], &out)
        .unwrap();
    assert_eq!(written, 1);

    let (header, rows) = read_crm_export(&out);
    assert_eq!(header, CRM_COLUMNS.to_vec());
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][0], "Компания - Кафе Ромашка");
    assert_eq!(rows[0][1], "Ленина 1");
    assert_eq!(rows[0][2], "79991234567");
    assert_eq!(rows[0][12], "Иван");
    assert_eq!(rows[0][14], "a.csv");
}

#[test]
fn test_multi_phone_cells_and_numeric_notation() {
    logging::init_test();
    let dir = TempDir::new().unwrap();
    let src = write_file(
        dir.path(),
        "numbers.csv",
        "title\tphone\tphone 2\n\
         A\t7.9991234567E10\t8 (495) 111-22-33, 89991234567\n\
         B\t79990000000.0\t\n\
         C\tnan\t12345\n",
    );

    let mut importer = LeadImporterImpl::default();
    let merged = importer.merge_files(&[&src]).unwrap();

    assert_eq!(merged.len(), 2);
    let first = &merged.rows()[0];
    assert_eq!(first.get("phone_1"), Some("79991234567"));
    assert_eq!(first.get("phone_2"), Some("74951112233"));
    assert_eq!(merged.rows()[1].get("phone_1"), Some("79990000000"));
    assert_eq!(merged.rows()[1].get("phone_2"), None);
    assert_eq!(importer.statistics().invalid_phones, 1);
    assert!(!merged.has_column("phone 2"));
}

#[test]
fn test_lead_api_full_run_with_owner_rotation() {
    logging::init_test();
    let (dir, conn) = create_test_db();
    let config = create_test_config(dir.path(), &["Иван", "Анна"]);
    let mut api = LeadApi::new(config, conn);

    let a = write_file(
        dir.path(),
        "a.csv",
        "title;phone;companyUrl\nA;89990000001;example.com/?utm_source=x&id=5\nB;89990000002;\nC;89990000003;\n",
    );
    let b = write_file(dir.path(), "b.csv", "title;phone\nD;89990000004\nA2;89990000001\n");
    let out = dir.path().join("export").join("crm.csv");
    std::fs::create_dir_all(out.parent().unwrap()).unwrap();

    let report = api.process_files(&[a, b], &out).unwrap();
    assert_eq!(report.status, RunStatus::Success);
    assert_eq!(report.stats.valid_rows, 4);
    assert_eq!(report.stats.duplicates_removed, 1);

    let (_, rows) = read_crm_export(&out);
    let owners: Vec<&str> = rows.iter().map(|r| r[12].as_str()).collect();
    // 每个来源文件重新从第一位负责人开始轮询
    assert_eq!(owners, vec!["Иван", "Анна", "Иван", "Иван"]);
    let sources: Vec<&str> = rows.iter().map(|r| r[14].as_str()).collect();
    assert_eq!(sources, vec!["a.csv", "a.csv", "a.csv", "b.csv"]);
    assert!(rows[0][4].contains("id=5"));
    assert!(!rows[0][4].contains("utm_source"));

    let history = api.history(5).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].stats, report.stats);
    assert_eq!(history[0].output_file.as_deref(), Some(out.display().to_string().as_str()));
}

#[test]
fn test_export_to_unwritable_path_records_failure() {
    logging::init_test();
    let (dir, conn) = create_test_db();
    let config = create_test_config(dir.path(), &[]);
    let mut api = LeadApi::new(config, conn);

    let a = write_file(dir.path(), "a.csv", "title,phone\nA,89990000001\n");
    let out = dir.path().join("missing_dir").join("crm.csv");

    let result = api.process_files(&[a], &out);
    assert!(result.is_err());
    assert!(!out.exists());
    assert_eq!(api.history(1).unwrap()[0].status, RunStatus::Failed);
}
