// ==========================================
// 线索工具 - Webbee 采集服务客户端
// ==========================================
// 认证: API 令牌作为查询参数 webbeeApiToken 附加到每个请求
// 结果: /tasks/{id}/result/csv 返回 TAB 分隔的 CSV 文本
// ==========================================

use crate::scraping::client_trait::{CreatedTask, ScrapingClient, TaskStatus};
use crate::scraping::error::{ScrapingError, ScrapingResult};
use async_trait::async_trait;
use reqwest::{Method, Response};
use serde_json::json;
use tracing::{debug, error, info};

pub const DEFAULT_BASE_URL: &str = "https://analytics.webbee-ai.ru/webbee-api/v1.0";
const TOKEN_PARAM: &str = "webbeeApiToken";

/// 采集机器人别名（界面名称 → API 别名）
pub const ROBOTS: [(&str, &str); 4] = [
    ("avito", "avito"),
    ("yandex_maps", "yandexmaps"),
    ("html", "html"),
    ("2gis", "2gis"),
];

/// 界面名称 → API 别名；未知名称原样使用
pub fn robot_alias(name: &str) -> &str {
    ROBOTS
        .iter()
        .find(|(k, _)| *k == name)
        .map(|(_, alias)| *alias)
        .unwrap_or(name)
}

pub struct WebbeeClient {
    client: reqwest::Client,
    base_url: String,
    api_token: String,
}

impl WebbeeClient {
    pub fn new(api_token: impl Into<String>) -> Self {
        Self::with_base_url(api_token, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token: api_token.into(),
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// 发送请求；非 2xx 转为 ScrapingError::Api
    async fn send(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<serde_json::Value>,
    ) -> ScrapingResult<Response> {
        let mut request = self
            .client
            .request(method.clone(), self.url(endpoint))
            .query(&[(TOKEN_PARAM, self.api_token.as_str())]);
        if let Some(body) = body {
            request = request.json(&body);
        }

        debug!(method = %method, endpoint, "采集服务请求");
        let response = request.send().await?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&text)
            .ok()
            .and_then(|v| v["error"].as_str().map(str::to_string))
            .unwrap_or_else(|| format!("HTTP Error {}", status.as_u16()));

        error!(endpoint, status = status.as_u16(), message = %message, "采集服务返回错误");
        Err(ScrapingError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl ScrapingClient for WebbeeClient {
    async fn create_task(
        &self,
        robot_alias: &str,
        urls: &[String],
        name: Option<&str>,
    ) -> ScrapingResult<CreatedTask> {
        let name = name
            .map(str::to_string)
            .unwrap_or_else(|| format!("Task_{}", chrono::Utc::now().timestamp()));
        let payload = json!({
            "robot": robot_alias,
            "name": name,
            "urls": urls.join("\n"),
        });

        info!(robot = robot_alias, name = %name, urls = urls.len(), "创建采集任务");
        let response = self.send(Method::POST, "/tasks", Some(payload)).await?;
        let task: CreatedTask = response
            .json()
            .await
            .map_err(|e| ScrapingError::InvalidResponse(e.to_string()))?;

        info!(task_id = task.id, "采集任务已创建");
        Ok(task)
    }

    async fn start_task(&self, task_id: i64) -> ScrapingResult<()> {
        info!(task_id, "启动采集任务");
        self.send(Method::PATCH, &format!("/tasks/{}/start", task_id), None)
            .await?;
        Ok(())
    }

    async fn poll_status(&self, task_id: i64) -> ScrapingResult<TaskStatus> {
        let response = self
            .send(Method::GET, &format!("/tasks/{}/status", task_id), None)
            .await?;
        let status: TaskStatus = response
            .json()
            .await
            .map_err(|e| ScrapingError::InvalidResponse(e.to_string()))?;

        if let Some(p) = &status.progress {
            debug!(task_id, total = p.total, processed = p.processed, success = p.success, "采集任务进度");
        }
        Ok(status)
    }

    async fn download_results_csv(&self, task_id: i64) -> ScrapingResult<Option<String>> {
        info!(task_id, "下载采集结果");
        let response = self
            .send(Method::GET, &format!("/tasks/{}/result/csv", task_id), None)
            .await?;
        let text = response.text().await?;

        if text.trim().is_empty() {
            tracing::warn!(task_id, "采集结果为空");
            return Ok(None);
        }
        Ok(Some(text))
    }

    async fn stop_task(&self, task_id: i64) -> ScrapingResult<()> {
        info!(task_id, "停止采集任务");
        self.send(Method::PATCH, &format!("/tasks/{}/stop", task_id), None)
            .await?;
        Ok(())
    }

    async fn delete_task(&self, task_id: i64) -> ScrapingResult<()> {
        info!(task_id, "删除采集任务");
        self.send(Method::DELETE, &format!("/tasks/{}", task_id), None)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_robot_alias() {
        assert_eq!(robot_alias("yandex_maps"), "yandexmaps");
        assert_eq!(robot_alias("custom"), "custom");
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = WebbeeClient::with_base_url("token", "http://localhost:8080/api/");
        assert_eq!(client.url("/tasks"), "http://localhost:8080/api/tasks");
    }

    #[tokio::test]
    async fn test_unreachable_service_is_request_error() {
        // 端口 9 (discard) 通常无监听
        let client = WebbeeClient::with_base_url("token", "http://127.0.0.1:9");
        let result = client.poll_status(1).await;
        assert!(matches!(result, Err(ScrapingError::Request(_))));
    }
}
