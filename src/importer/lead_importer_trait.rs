// ==========================================
// 线索工具 - 线索导入 Trait
// ==========================================
// 职责: 定义导入管道各阶段接口（不包含实现）
// 管道: 解析 → 电话修复 → 列对齐 → 行过滤 → 合并去重
// ==========================================

use crate::domain::lead::ProcessingStats;
use crate::domain::table::Table;
use crate::importer::error::ImportResult;
use std::path::Path;

// ==========================================
// LeadImporter Trait
// ==========================================
// 用途: 导入与合并主接口
// 实现者: LeadImporterImpl
pub trait LeadImporter {
    /// 读取单个文件（分隔符嗅探 + 电话列数值修复）
    ///
    /// # 返回
    /// - Ok(Table): 原始表
    /// - Err: 所有解析方案均失败 / 文件不可读
    fn load(&self, file_path: &Path) -> ImportResult<Table>;

    /// 列对齐: 提取电话 → 改名 → 收窄列 → 丢弃无电话行
    fn reconcile(&mut self, table: Table) -> Table;

    /// 合并多个文件并按 phone_1 去重（首次出现优先）
    ///
    /// 单个文件读取失败只记日志并跳过
    ///
    /// # 返回
    /// - Some(Table): 合并结果
    /// - None: 没有任何文件导入成功
    fn merge_files<P: AsRef<Path>>(&mut self, file_paths: &[P]) -> Option<Table>;

    /// 当前运行的累计统计
    fn statistics(&self) -> ProcessingStats;
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口（阶段 0）
// 实现者: CsvParser, ExcelParser, UniversalFileParser
pub trait FileParser: Send + Sync {
    /// 解析文件为表
    fn parse_table(&self, file_path: &Path) -> ImportResult<Table>;
}

// ==========================================
// ColumnReconciler Trait
// ==========================================
// 用途: 列对齐（阶段 1）
// 实现者: LeadColumnReconciler
pub trait ColumnReconciler: Send + Sync {
    /// 识别电话列（列名含 "phone" / "телефон"，不区分大小写），保持文件列顺序
    fn phone_columns(&self, table: &Table) -> Vec<String>;

    /// 提取电话到 phone_1 / phone_2 并删除原电话列
    fn extract_phones(&self, table: &mut Table);

    /// 别名改名 + 按允许列表收窄
    fn narrow_columns(&self, table: &mut Table);

    /// 丢弃两个电话槽位均缺失的行
    ///
    /// # 返回
    /// - 被丢弃的行数
    fn drop_rows_without_phone(&self, table: &mut Table) -> usize;
}

// ==========================================
// DuplicateHandler Trait
// ==========================================
// 用途: 合并去重（阶段 2）
// 实现者: DuplicateHandler
pub trait DuplicateHandler: Send + Sync {
    /// 检测重复行（按 phone_1，首次出现优先，缺失值不参与比较）
    ///
    /// # 返回
    /// - Vec<(行下标, phone_1)>: 重复记录（不含首次出现）
    fn detect_duplicates(&self, table: &Table) -> Vec<(usize, String)>;

    /// 删除重复行，返回删除数量
    fn remove_duplicates(&self, table: &mut Table) -> usize;
}
