// ==========================================
// 线索工具 - 领域层
// ==========================================
// 职责: 表格结构、线索实体、运行历史与类型
// ==========================================

pub mod history;
pub mod lead;
pub mod table;
pub mod types;

pub use history::{Manager, ProcessingRun};
pub use lead::{columns, CrmRecord, ProcessingStats, CRM_COLUMNS};
pub use table::{Row, Table};
pub use types::{RunStatus, SocialPlatform, Theme};
