// ==========================================
// 线索工具 - 应用配置文档
// ==========================================
// 存储: JSON 文件（pretty，保留非 ASCII 字符）
// 说明: 缺失字段按默认值补齐，旧版配置文件可直接读取
// ==========================================

use crate::domain::types::Theme;
use crate::importer::phone_validator::{
    PhoneValidator, DEFAULT_MAX_MAGNITUDE, DEFAULT_MIN_MAGNITUDE,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 配置层错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败 ({path}): {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("配置文件解析失败 ({path}): {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("配置序列化失败: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("无法确定配置目录")]
    NoConfigDir,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub app_name: String,
    pub version: String,
    /// 负责人名册（CRM 轮询分配顺序）
    pub managers: Vec<String>,
    pub paths: PathsConfig,
    pub settings: SettingsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub input: String,
    pub output: String,
    pub reports: String,
    pub database: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
    pub preview_rows: usize,
    pub theme: Theme,
    /// 科学计数法电话的量级下界
    pub phone_min_magnitude: f64,
    /// 科学计数法电话的量级上界
    pub phone_max_magnitude: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: "Lead Generation System".to_string(),
            version: "1.0.0".to_string(),
            managers: Vec::new(),
            paths: PathsConfig::default(),
            settings: SettingsConfig::default(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input: "data/input".to_string(),
            output: "data/output".to_string(),
            reports: "data/reports".to_string(),
            database: "data/database.db".to_string(),
        }
    }
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            preview_rows: 10,
            theme: Theme::Dark,
            phone_min_magnitude: DEFAULT_MIN_MAGNITUDE,
            phone_max_magnitude: DEFAULT_MAX_MAGNITUDE,
        }
    }
}

impl AppConfig {
    /// 按配置的量级范围构造电话校验器
    pub fn phone_validator(&self) -> PhoneValidator {
        PhoneValidator::with_bounds(
            self.settings.phone_min_magnitude,
            self.settings.phone_max_magnitude,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_document_uses_defaults() {
        let json = r#"{ "managers": ["Иван"], "settings": { "theme": "light" } }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.managers, vec!["Иван"]);
        assert_eq!(config.settings.theme, Theme::Light);
        assert_eq!(config.settings.preview_rows, 10);
        assert_eq!(config.paths.database, "data/database.db");
        assert_eq!(config.settings.phone_max_magnitude, 9e11);
    }

    #[test]
    fn test_phone_validator_uses_configured_bounds() {
        let mut config = AppConfig::default();
        config.settings.phone_min_magnitude = 8e10;
        assert_eq!(config.phone_validator().clean_str("7.9e+10"), None);
    }
}
