// ==========================================
// 线索工具 - 核心库
// ==========================================
// 职责: 采集线索清洗 → 电话标准化 → 合并去重 → CRM 导入文件
//       以及基于 CRM 导出的转化分析
// 技术栈: Rust + SQLite + CSV/Excel
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 表格、线索、运行历史
pub mod domain;

// 导入层 - 解析、电话校验、列对齐、去重
pub mod importer;

// 导出层 - CRM 导入文件
pub mod exporter;

// 分析层 - CRM 转化指标
pub mod analytics;

// 数据仓储层 - 运行历史与负责人名册
pub mod repository;

// 配置层 - JSON 配置文档
pub mod config;

// 采集服务 - 任务客户端与地图链接
pub mod scraping;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

pub use domain::{CrmRecord, ProcessingStats, Row, RunStatus, Table};
pub use importer::{LeadImporter, LeadImporterImpl, PhoneValidator};
pub use exporter::CrmExporter;
pub use analytics::{CrmAnalytics, CrmMetrics};
pub use api::{AnalyticsApi, ApiError, ApiResult, LeadApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "Lead Instrument";
