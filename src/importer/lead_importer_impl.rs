// ==========================================
// 线索工具 - 线索导入器实现
// ==========================================
// 职责: 整合导入流程，从源文件到去重后的合并表
// 流程: 解析 → 电话修复 → 电话提取 → 列收窄 → 行过滤 → 标记来源 → 合并去重
// ==========================================

use crate::domain::lead::{columns, ProcessingStats};
use crate::domain::table::Table;
use crate::importer::column_reconciler::LeadColumnReconciler;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::duplicate_handler::DuplicateHandler as DuplicateHandlerImpl;
use crate::importer::error::ImportResult;
use crate::importer::file_parser::{CsvParser, UniversalFileParser};
use crate::importer::lead_importer_trait::{
    ColumnReconciler, DuplicateHandler, FileParser, LeadImporter,
};
use crate::importer::phone_validator::PhoneValidator;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

// ==========================================
// LeadImporterImpl - 线索导入器实现
// ==========================================
// 一个实例 = 一次运行上下文；统计在实例内累加
pub struct LeadImporterImpl {
    // 导入组件
    file_parser: Box<dyn FileParser>,
    content_parser: CsvParser,
    reconciler: Box<dyn ColumnReconciler>,
    duplicate_handler: Box<dyn DuplicateHandler>,
    data_cleaner: DataCleaner,

    // 运行统计
    stats: ProcessingStats,
}

impl LeadImporterImpl {
    /// 创建新的 LeadImporter 实例
    ///
    /// # 参数
    /// - file_parser: 文件解析器
    /// - reconciler: 列对齐器
    /// - duplicate_handler: 重复处理器
    pub fn new(
        file_parser: Box<dyn FileParser>,
        reconciler: Box<dyn ColumnReconciler>,
        duplicate_handler: Box<dyn DuplicateHandler>,
    ) -> Self {
        Self {
            file_parser,
            content_parser: CsvParser::for_lead_sources(),
            reconciler,
            duplicate_handler,
            data_cleaner: DataCleaner,
            stats: ProcessingStats::default(),
        }
    }

    /// 默认组件装配（电话校验器可自定义量级范围）
    pub fn with_validator(validator: PhoneValidator) -> Self {
        Self::new(
            Box::new(UniversalFileParser::default()),
            Box::new(LeadColumnReconciler::new(validator)),
            Box::new(DuplicateHandlerImpl),
        )
    }

    /// 导入一张已读取的表: 对齐列、过滤行、标记来源
    pub fn ingest(&mut self, table: Table, source_label: &str) -> Table {
        let initial_rows = table.len();
        self.stats.total_rows += initial_rows;
        info!(source = %source_label, rows = initial_rows, "开始处理文件");

        let mut table = self.reconcile(table);
        self.stats.files_processed += 1;

        table.fill_column(columns::SOURCE_FILE, source_label);
        table
    }

    /// 导入内存中的 CSV 文本（采集服务下载结果）
    pub fn ingest_content(&mut self, content: &str, source_label: &str) -> ImportResult<Table> {
        let mut table = self.content_parser.parse_content(content)?;
        self.data_cleaner.repair_phone_cells(&mut table);
        Ok(self.ingest(table, source_label))
    }

    /// 合并已导入的表并按 phone_1 去重
    ///
    /// # 返回
    /// - None: 输入为空
    pub fn merge_tables(&mut self, tables: Vec<Table>) -> Option<Table> {
        if tables.is_empty() {
            warn!("没有可合并的数据");
            return None;
        }

        let mut merged = Table::concat(tables);
        let duplicates = self.duplicate_handler.detect_duplicates(&merged);
        debug!(count = duplicates.len(), "检测到重复电话");

        let removed = self.duplicate_handler.remove_duplicates(&mut merged);
        self.stats.duplicates_removed = removed;
        self.stats.valid_rows = merged.len();

        if removed > 0 {
            info!(duplicates_removed = removed, "已删除重复记录");
        }
        info!(valid_rows = merged.len(), "合并完成");
        Some(merged)
    }
}

impl Default for LeadImporterImpl {
    fn default() -> Self {
        Self::with_validator(PhoneValidator::default())
    }
}

impl LeadImporter for LeadImporterImpl {
    #[instrument(skip(self, file_path), fields(file = %file_path.display()))]
    fn load(&self, file_path: &Path) -> ImportResult<Table> {
        let mut table = self.file_parser.parse_table(file_path)?;
        let repaired = self.data_cleaner.repair_phone_cells(&mut table);
        if repaired > 0 {
            debug!(cells = repaired, "电话列数值已修复");
        }
        Ok(table)
    }

    fn reconcile(&mut self, mut table: Table) -> Table {
        self.reconciler.extract_phones(&mut table);
        self.reconciler.narrow_columns(&mut table);
        let dropped = self.reconciler.drop_rows_without_phone(&mut table);

        self.stats.invalid_phones += dropped;
        if dropped > 0 {
            warn!(rows = dropped, "已删除无有效电话的行");
        }
        table
    }

    fn merge_files<P: AsRef<Path>>(&mut self, file_paths: &[P]) -> Option<Table> {
        let mut ingested = Vec::new();

        for path in file_paths {
            let path = path.as_ref();
            let table = match self.load(path) {
                Ok(t) => t,
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "文件读取失败，已跳过");
                    continue;
                }
            };
            let label = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            ingested.push(self.ingest(table, &label));
        }

        self.merge_tables(ingested)
    }

    fn statistics(&self) -> ProcessingStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_repairs_phone_cells() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "a.csv", "title,phone_1\nA,7.9991234567e+10\n");

        let importer = LeadImporterImpl::default();
        let table = importer.load(&path).unwrap();
        assert_eq!(table.rows()[0].get("phone_1"), Some("79991234567"));
    }

    #[test]
    fn test_merge_dedupes_across_files() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.csv", "title,phone_1\nA,89991234567\n");
        let b = write_file(&dir, "b.csv", "title;phone_1\nB;79991234567\n");

        let mut importer = LeadImporterImpl::default();
        let merged = importer.merge_files(&[a, b]).unwrap();

        assert_eq!(merged.len(), 1);
        assert_eq!(merged.rows()[0].get(columns::NAME), Some("A"));
        assert_eq!(merged.rows()[0].get(columns::SOURCE_FILE), Some("a.csv"));

        let stats = importer.statistics();
        assert_eq!(stats.duplicates_removed, 1);
        assert_eq!(stats.valid_rows, 1);
        assert_eq!(stats.total_rows, 2);
        assert_eq!(stats.files_processed, 2);
    }

    #[test]
    fn test_merge_skips_unreadable_files() {
        let dir = TempDir::new().unwrap();
        let good = write_file(&dir, "good.csv", "title,phone\nA,89991234567\nB,12\n");
        let missing = dir.path().join("missing.csv");

        let mut importer = LeadImporterImpl::default();
        let merged = importer.merge_files(&[missing, good]).unwrap();

        assert_eq!(merged.len(), 1);
        let stats = importer.statistics();
        assert_eq!(stats.files_processed, 1);
        assert_eq!(stats.invalid_phones, 1);
    }

    #[test]
    fn test_merge_without_any_file_is_none() {
        let dir = TempDir::new().unwrap();
        let mut importer = LeadImporterImpl::default();
        assert!(importer.merge_files(&[dir.path().join("nope.csv")]).is_none());
        let no_paths: [&Path; 0] = [];
        assert!(importer.merge_files(&no_paths).is_none());
    }

    #[test]
    fn test_ingest_content() {
        let mut importer = LeadImporterImpl::default();
        let table = importer
            .ingest_content("title\tphone\nКафе\t8 999 123 45 67\n", "webbee_task.csv")
            .unwrap();
        assert_eq!(table.rows()[0].get(columns::PHONE_1), Some("79991234567"));
        assert_eq!(table.rows()[0].get(columns::SOURCE_FILE), Some("webbee_task.csv"));
    }
}
