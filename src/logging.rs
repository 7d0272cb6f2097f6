// ==========================================
// 日志系统初始化
// ==========================================
// 输出格式: 文本（终端阅读）/ JSON（交给日志收集）
// 级别: --log-level 优先，其次 RUST_LOG，默认 info
// ==========================================

use std::fmt;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

/// 日志输出格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "plain" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("未知日志格式: {} (可选 text / json)", other)),
        }
    }
}

/// 过滤器: 显式级别 > RUST_LOG > info
fn build_filter(level: Option<&str>) -> EnvFilter {
    match level {
        Some(directives) => EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new("info")),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    }
}

/// 按格式与级别初始化日志
///
/// 日志写到 stderr，stdout 留给命令输出。重复初始化时忽略。
///
/// # 示例
/// ```no_run
/// use lead_instrument::logging::{self, LogFormat};
/// logging::init_with(LogFormat::Json, Some("lead_instrument=debug"));
/// ```
pub fn init_with(format: LogFormat, level: Option<&str>) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(build_filter(level))
        .with_writer(std::io::stderr);

    let _ = match format {
        LogFormat::Text => builder.with_target(false).try_init(),
        LogFormat::Json => builder
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .try_init(),
    };
}

/// 文本格式，级别取 RUST_LOG
pub fn init() {
    init_with(LogFormat::Text, None);
}

/// 测试用: debug 级别，输出交给测试框架捕获
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("lead_instrument=debug"))
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!("json".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!(" JSON ".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!("plain".parse::<LogFormat>(), Ok(LogFormat::Text));
        assert!("xml".parse::<LogFormat>().is_err());
        assert_eq!(LogFormat::default(), LogFormat::Text);
        assert_eq!(LogFormat::Json.to_string(), "json");
    }

    #[test]
    fn test_explicit_level_overrides_env() {
        let filter = build_filter(Some("lead_instrument=trace"));
        assert_eq!(filter.to_string(), "lead_instrument=trace");

        // 非法指令回落到 info
        let filter = build_filter(Some("lead_instrument=loud"));
        assert_eq!(filter.to_string(), "info");
    }

    #[test]
    fn test_json_init_is_idempotent() {
        init_with(LogFormat::Json, Some("warn"));
        init_with(LogFormat::Text, None);
        init_test();
        tracing::warn!(format = %LogFormat::Json, "重复初始化不应 panic");
    }
}
