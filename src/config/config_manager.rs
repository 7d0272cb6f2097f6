// ==========================================
// 线索工具 - 配置管理器
// ==========================================
// 职责: 配置加载、保存、名册与主题变更
// 存储: JSON 文件
// 规则:
// - 文件不存在 → 写入默认配置并返回
// - 文件不可读/非法 JSON → 告警并使用默认配置（不覆盖原文件）
// ==========================================

use crate::config::app_config::{AppConfig, ConfigError};
use crate::domain::types::Theme;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// 配置目录下的应用子目录名
pub const CONFIG_DIR_NAME: &str = "lead-instrument";
pub const CONFIG_FILE_NAME: &str = "config.json";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    path: PathBuf,
    config: AppConfig,
}

impl ConfigManager {
    /// 默认配置文件位置: <系统配置目录>/lead-instrument/config.json
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// 加载配置
    ///
    /// # 参数
    /// - path: 配置文件路径
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            let manager = Self {
                path,
                config: AppConfig::default(),
            };
            match manager.save() {
                Ok(()) => info!(path = %manager.path.display(), "已创建默认配置"),
                Err(e) => warn!(error = %e, "默认配置写入失败"),
            }
            return manager;
        }

        let config = match read_config(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "配置加载失败，使用默认配置");
                AppConfig::default()
            }
        };
        Self { path, config }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn managers(&self) -> &[String] {
        &self.config.managers
    }

    /// 写回配置文件（父目录不存在时自动创建）
    pub fn save(&self) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: self.path.display().to_string(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        let text = serde_json::to_string_pretty(&self.config)?;
        std::fs::write(&self.path, text).map_err(io_err)?;
        Ok(())
    }

    /// 替换负责人名册并保存
    pub fn set_managers(&mut self, managers: Vec<String>) -> Result<(), ConfigError> {
        self.config.managers = managers
            .into_iter()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();
        self.save()?;
        info!(count = self.config.managers.len(), "负责人名册已保存");
        Ok(())
    }

    /// 切换主题并保存，返回新主题
    pub fn toggle_theme(&mut self) -> Result<Theme, ConfigError> {
        self.config.settings.theme = self.config.settings.theme.toggled();
        self.save()?;
        Ok(self.config.settings.theme)
    }
}

fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}
