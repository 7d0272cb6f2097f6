// ==========================================
// 线索工具 - 配置层
// ==========================================
// 职责: 应用元数据、负责人名册、路径与界面设置
// 存储: JSON 文件（启动时加载一次，名册/主题变更时重写）
// ==========================================

pub mod app_config;
pub mod config_manager;

pub use app_config::{AppConfig, ConfigError, PathsConfig, SettingsConfig};
pub use config_manager::ConfigManager;
