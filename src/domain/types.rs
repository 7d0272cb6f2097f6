// ==========================================
// 线索工具 - 领域类型定义
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 运行结果 (Run Status)
// ==========================================
// 序列化格式: snake_case (与数据库一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Success, // 导出成功
    NoData,  // 无可用数据
    Failed,  // 导出失败
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Success => write!(f, "success"),
            RunStatus::NoData => write!(f, "no_data"),
            RunStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for RunStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(RunStatus::Success),
            "no_data" => Ok(RunStatus::NoData),
            "failed" => Ok(RunStatus::Failed),
            other => Err(format!("未知运行状态: {}", other)),
        }
    }
}

// ==========================================
// 社交平台 (Social Platform)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialPlatform {
    Telegram,
    Vkontakte,
}

impl SocialPlatform {
    /// 个人页所在域名
    pub fn domain(&self) -> &'static str {
        match self {
            SocialPlatform::Telegram => "t.me",
            SocialPlatform::Vkontakte => "vk.com",
        }
    }
}

impl fmt::Display for SocialPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SocialPlatform::Telegram => write!(f, "telegram"),
            SocialPlatform::Vkontakte => write!(f, "vkontakte"),
        }
    }
}

impl FromStr for SocialPlatform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "telegram" | "tg" => Ok(SocialPlatform::Telegram),
            "vkontakte" | "vk" => Ok(SocialPlatform::Vkontakte),
            other => Err(format!("未知社交平台: {}", other)),
        }
    }
}

// ==========================================
// 界面主题 (Theme)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Dark => write!(f, "dark"),
            Theme::Light => write!(f, "light"),
        }
    }
}
