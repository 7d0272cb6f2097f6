// ==========================================
// 线索工具 - API 层
// ==========================================
// 职责: 提供业务 API 接口，供命令行入口调用
// ==========================================

pub mod analytics_api;
pub mod error;
pub mod lead_api;

// 重导出核心类型
pub use analytics_api::{AnalyticsApi, AnalyticsReport};
pub use error::{ApiError, ApiResult};
pub use lead_api::{LeadApi, ProcessingReport};
