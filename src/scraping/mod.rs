// ==========================================
// 线索工具 - 采集服务层
// ==========================================
// 职责: 采集任务客户端、地图搜索链接生成
// 说明: 下载的 CSV 文本回到导入管道（LeadImporterImpl::ingest_content）
// ==========================================

pub mod client_trait;
pub mod error;
pub mod map_url_generator;
pub mod webbee_client;

pub use client_trait::{CreatedTask, ScrapingClient, TaskProgress, TaskStatus};
pub use error::{ScrapingError, ScrapingResult};
pub use map_url_generator::{MapSearchUrl, MapUrlGenerator};
pub use webbee_client::{robot_alias, WebbeeClient};
