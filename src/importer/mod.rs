// ==========================================
// 线索工具 - 导入层
// ==========================================
// 职责: 采集结果文件 → 规范化、去重后的线索表
// 支持: CSV（分隔符自动识别）, Excel
// ==========================================

// 模块声明
pub mod column_reconciler;
pub mod data_cleaner;
pub mod duplicate_handler;
pub mod error;
pub mod file_parser;
pub mod lead_importer_impl;
pub mod lead_importer_trait;
pub mod phone_validator;

// 重导出核心类型
pub use column_reconciler::LeadColumnReconciler;
pub use data_cleaner::DataCleaner;
pub use duplicate_handler::DuplicateHandler as DuplicateHandlerImpl;
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};
pub use lead_importer_impl::LeadImporterImpl;
pub use phone_validator::{format_phone_for_display, PhoneValidator};

// 重导出 Trait 接口
pub use lead_importer_trait::{ColumnReconciler, DuplicateHandler, FileParser, LeadImporter};
