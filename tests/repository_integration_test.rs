// ==========================================
// 集成测试 - 仓储层与配置
// ==========================================
// 测试目标: 运行历史与负责人名册在文件数据库中持久化
// 覆盖范围: db + HistoryRepository + ManagerRepository + ConfigManager
// ==========================================

mod test_helpers;

use chrono::Local;
use lead_instrument::config::ConfigManager;
use lead_instrument::db;
use lead_instrument::domain::history::ProcessingRun;
use lead_instrument::domain::lead::ProcessingStats;
use lead_instrument::domain::types::RunStatus;
use lead_instrument::repository::{HistoryRepository, ManagerRepository};
use test_helpers::{create_test_config, create_test_db};

fn make_run(status: RunStatus, files: &[&str]) -> ProcessingRun {
    ProcessingRun {
        run_id: uuid::Uuid::new_v4().to_string(),
        input_files: files.iter().map(|f| f.to_string()).collect(),
        output_file: Some("out.csv".to_string()),
        stats: ProcessingStats {
            total_rows: 10,
            valid_rows: 7,
            duplicates_removed: 2,
            invalid_phones: 1,
            files_processed: files.len(),
        },
        duration_ms: 42,
        status,
        processed_at: Local::now().naive_local(),
    }
}

#[test]
fn test_history_survives_reopen() {
    let (dir, conn) = create_test_db();
    let repo = HistoryRepository::new(conn);
    let first = make_run(RunStatus::Success, &["a.csv", "b.csv"]);
    let second = make_run(RunStatus::NoData, &["c.csv"]);
    repo.insert(&first).unwrap();
    repo.insert(&second).unwrap();
    drop(repo);

    let reopened = db::open_shared(&dir.path().join("lead.db")).unwrap();
    let repo = HistoryRepository::new(reopened);
    assert_eq!(repo.count().unwrap(), 2);

    let runs = repo.list_recent(10).unwrap();
    assert_eq!(runs[0].run_id, second.run_id);
    assert_eq!(runs[0].status, RunStatus::NoData);
    assert_eq!(runs[1].input_files, vec!["a.csv", "b.csv"]);
    assert_eq!(runs[1].stats, first.stats);
    assert_eq!(repo.list_recent(1).unwrap().len(), 1);
}

#[test]
fn test_roster_replacement_deactivates_missing_names() {
    let (_dir, conn) = create_test_db();
    let repo = ManagerRepository::new(conn);

    repo.save_roster(&["Иван".to_string(), "Анна".to_string()]).unwrap();
    repo.save_roster(&["Анна".to_string(), "Пётр".to_string()]).unwrap();

    assert_eq!(repo.list_active().unwrap(), vec!["Анна", "Пётр"]);
    let all = repo.list_all().unwrap();
    assert_eq!(all.len(), 3);
    assert!(all.iter().any(|m| m.name == "Иван" && !m.is_active));
}

#[test]
fn test_config_roster_roundtrip_through_file() {
    let (dir, _conn) = create_test_db();
    let config = create_test_config(dir.path(), &["Иван", "Анна"]);
    assert_eq!(config.managers(), &["Иван", "Анна"]);

    let reloaded = ConfigManager::load(config.path());
    assert_eq!(reloaded.managers(), &["Иван", "Анна"]);
    assert_eq!(reloaded.config().settings.preview_rows, 10);
}
