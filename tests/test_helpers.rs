// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时数据库、临时配置、源文件生成
// ==========================================

#![allow(dead_code)]

use lead_instrument::config::ConfigManager;
use lead_instrument::db;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - TempDir: 临时目录（需要保持存活）
/// - Arc<Mutex<Connection>>: 共享连接
pub fn create_test_db() -> (TempDir, Arc<Mutex<Connection>>) {
    let dir = TempDir::new().expect("临时目录创建失败");
    let conn = db::open_shared(&dir.path().join("lead.db")).expect("数据库初始化失败");
    (dir, conn)
}

/// 在临时目录中加载（并生成）默认配置，可预置负责人名册
pub fn create_test_config(dir: &Path, managers: &[&str]) -> ConfigManager {
    let mut config = ConfigManager::load(dir.join("config.json"));
    if !managers.is_empty() {
        config
            .set_managers(managers.iter().map(|m| m.to_string()).collect())
            .expect("名册保存失败");
    }
    config
}

/// 写入源文件
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("测试文件写入失败");
    path
}

/// 读取导出文件: 去掉 BOM，按 ';' 拆分，去掉引号
pub fn read_crm_export(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let bytes = std::fs::read(path).expect("导出文件读取失败");
    assert!(bytes.starts_with(&[0xEF, 0xBB, 0xBF]), "导出文件缺少 BOM");

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .from_reader(&bytes[3..]);
    let header = reader
        .headers()
        .expect("表头读取失败")
        .iter()
        .map(str::to_string)
        .collect();
    let rows = reader
        .records()
        .map(|r| r.expect("行读取失败").iter().map(str::to_string).collect())
        .collect();
    (header, rows)
}
