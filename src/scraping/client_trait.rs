// ==========================================
// 线索工具 - 采集服务客户端 Trait
// ==========================================
// 流程: 创建任务 → 启动 → 轮询状态 → 下载 CSV → 回到导入管道
// 说明: 导入管道不依赖采集服务可用性，只消费其 CSV 输出
// ==========================================

use crate::scraping::error::ScrapingResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedTask {
    pub id: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskProgress {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub processed: u64,
    #[serde(default)]
    pub success: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatus {
    #[serde(default)]
    pub progress: Option<TaskProgress>,
    #[serde(default)]
    pub completed_at: Option<String>,
}

impl TaskStatus {
    pub fn is_completed(&self) -> bool {
        self.completed_at.as_deref().map_or(false, |s| !s.is_empty())
    }
}

// ==========================================
// ScrapingClient Trait
// ==========================================
// 实现者: WebbeeClient
#[async_trait]
pub trait ScrapingClient: Send + Sync {
    /// 创建采集任务
    async fn create_task(
        &self,
        robot_alias: &str,
        urls: &[String],
        name: Option<&str>,
    ) -> ScrapingResult<CreatedTask>;

    async fn start_task(&self, task_id: i64) -> ScrapingResult<()>;

    async fn poll_status(&self, task_id: i64) -> ScrapingResult<TaskStatus>;

    /// 下载结果 CSV 文本；结果为空时返回 None
    async fn download_results_csv(&self, task_id: i64) -> ScrapingResult<Option<String>>;

    async fn stop_task(&self, task_id: i64) -> ScrapingResult<()>;

    async fn delete_task(&self, task_id: i64) -> ScrapingResult<()>;

    /// 轮询直到任务完成
    ///
    /// # 返回
    /// - Ok(true): 已完成
    /// - Ok(false): 超过最长等待时间
    /// - Err: 轮询出错
    async fn wait_for_completion(
        &self,
        task_id: i64,
        interval: Duration,
        max_wait: Duration,
        on_progress: &(dyn for<'p> Fn(&'p TaskProgress) + Send + Sync),
    ) -> ScrapingResult<bool> {
        let started = tokio::time::Instant::now();

        while started.elapsed() < max_wait {
            let status = self.poll_status(task_id).await?;
            if let Some(progress) = &status.progress {
                on_progress(progress);
            }
            if status.is_completed() {
                info!(task_id, "采集任务已完成");
                return Ok(true);
            }
            tokio::time::sleep(interval).await;
        }

        warn!(task_id, max_wait_secs = max_wait.as_secs(), "采集任务等待超时");
        Ok(false)
    }
}
