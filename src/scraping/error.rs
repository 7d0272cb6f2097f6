// ==========================================
// 线索工具 - 采集服务错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapingError {
    #[error("请求失败: {0}")]
    Request(String),

    /// 服务端返回非 2xx；message 优先取响应体中的 error 字段
    #[error("API 错误 ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("响应格式无效: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ScrapingError {
    fn from(err: reqwest::Error) -> Self {
        ScrapingError::Request(err.to_string())
    }
}

pub type ScrapingResult<T> = Result<T, ScrapingError>;
