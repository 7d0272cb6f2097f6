// ==========================================
// 线索工具 - 分析层
// ==========================================
// 职责: CRM 导出 → 转化指标与文本报告
// ==========================================

pub mod crm_analytics;

pub use crm_analytics::{conversion, CrmAnalytics, CrmMetrics};
