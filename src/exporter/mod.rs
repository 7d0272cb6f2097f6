// ==========================================
// 线索工具 - 导出层
// ==========================================
// 职责: 合并线索表 → CRM 导入文件
// ==========================================

pub mod crm_exporter;
pub mod crm_mapper;
pub mod crm_writer;

pub use crm_exporter::CrmExporter;
pub use crm_mapper::{assign_owner, CrmMapper};
pub use crm_writer::CrmCsvWriter;
