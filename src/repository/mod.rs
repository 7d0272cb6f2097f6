// ==========================================
// 线索工具 - 数据仓储层
// 红线: Repository 不含业务逻辑
// 职责: 运行历史与负责人名册的持久化
// 约束: 所有查询使用参数化
// ==========================================

pub mod error;
pub mod history_repo;
pub mod manager_repo;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use history_repo::HistoryRepository;
pub use manager_repo::ManagerRepository;
