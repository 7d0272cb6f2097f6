// ==========================================
// 线索工具 - 运行历史领域模型
// ==========================================
// 对齐: processing_history / managers 表
// ==========================================

use crate::domain::lead::ProcessingStats;
use crate::domain::types::RunStatus;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// ProcessingRun - 一次处理运行记录
// ==========================================
// 只追加，不修改
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingRun {
    pub run_id: String,                 // 运行ID (uuid v4)
    pub input_files: Vec<String>,       // 输入文件列表
    pub output_file: Option<String>,    // 导出文件（失败时可为空）
    pub stats: ProcessingStats,         // 全部统计字段
    pub duration_ms: i64,               // 耗时（毫秒）
    pub status: RunStatus,              // 运行结果
    pub processed_at: NaiveDateTime,    // 记录时间
}

// ==========================================
// Manager - 负责人名册条目
// ==========================================
// name 唯一
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manager {
    pub name: String,
    pub is_active: bool,
}
