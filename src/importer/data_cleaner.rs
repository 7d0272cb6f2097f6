// ==========================================
// 线索工具 - 数据清洗器实现
// ==========================================
// 职责: 空值标准化 / 电话列数值修复 / URL 去跟踪参数 / 社交账号提取
// ==========================================

use crate::domain::table::Table;
use crate::domain::types::SocialPlatform;
use crate::importer::phone_validator::is_null_like;
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// 需要从 URL 中移除的跟踪参数
pub const TRACKING_PARAMS: [&str; 11] = [
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_content",
    "utm_term",
    "yclid",
    "gclid",
    "fbclid",
    "_openstat",
    "from",
    "ref",
];

static TELEGRAM_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"t\.me/([a-zA-Z0-9_]+)").unwrap());
static VK_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"vk\.com/([a-zA-Z0-9_]+)").unwrap());

#[derive(Debug, Default, Clone, Copy)]
pub struct DataCleaner;

impl DataCleaner {
    /// 标准化 NULL 值（空白 / "nan" / "none" → None）
    pub fn normalize_null(&self, value: Option<&str>) -> Option<String> {
        value.and_then(|v| {
            let trimmed = v.trim();
            if is_null_like(trimmed) {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
    }

    /// 电话列数值修复
    ///
    /// 列名包含 "phone"（不区分大小写）的列中，数值样式的单元格
    /// 统一渲染为整数串（无科学计数法、无小数点）；其余原样保留。
    ///
    /// # 返回
    /// - 被改写的单元格数量
    pub fn repair_phone_cells(&self, table: &mut Table) -> usize {
        let phone_columns: Vec<String> = table
            .columns()
            .iter()
            .filter(|c| c.to_lowercase().contains("phone"))
            .cloned()
            .collect();

        let mut repaired = 0;
        for row in table.rows_mut() {
            for column in &phone_columns {
                let rendered = match row.get(column).and_then(render_numeric) {
                    Some(r) => r,
                    None => continue,
                };
                if row.get(column) != Some(rendered.as_str()) {
                    repaired += 1;
                }
                row.set(column, Some(rendered));
            }
        }
        repaired
    }

    /// 清理 URL 中的跟踪参数
    ///
    /// - 无协议时按 http:// 处理
    /// - 查询参数按键分组，剔除 TRACKING_PARAMS 中的键（空值参数一并丢弃）
    /// - 解析失败时返回去首尾空白的原值
    pub fn clean_url(&self, raw: Option<&str>) -> Option<String> {
        let original = self.normalize_null(raw)?;

        let lower = original.to_lowercase();
        let candidate = if lower.starts_with("http://") || lower.starts_with("https://") {
            original.clone()
        } else {
            format!("http://{}", original)
        };

        if Url::parse(&candidate).is_err() {
            tracing::debug!(url = %original, "URL 解析失败，保留原值");
            return Some(original);
        }

        Some(strip_tracking(&candidate))
    }

    /// 从社交链接中提取用户名；不匹配时返回去空白原值
    pub fn extract_social_username(
        &self,
        raw: Option<&str>,
        platform: SocialPlatform,
    ) -> Option<String> {
        let value = self.normalize_null(raw)?;

        let pattern = match platform {
            SocialPlatform::Telegram => &TELEGRAM_PATTERN,
            SocialPlatform::Vkontakte => &VK_PATTERN,
        };

        match pattern.captures(&value).and_then(|c| c.get(1)) {
            Some(m) => Some(m.as_str().to_string()),
            None => Some(value),
        }
    }
}

/// 数值样式单元格 → 整数串
fn render_numeric(cell: &str) -> Option<String> {
    let trimmed = cell.trim();
    if !trimmed.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: f64 = trimmed.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(format!("{:.0}", value))
}

/// 重组 URL: 协议+主机+路径 原样保留，查询串重新编码，片段原样保留
fn strip_tracking(candidate: &str) -> String {
    let (without_fragment, fragment) = match candidate.split_once('#') {
        Some((head, frag)) => (head, Some(frag)),
        None => (candidate, None),
    };
    let (base, query) = match without_fragment.split_once('?') {
        Some((head, q)) => (head, q),
        None => (without_fragment, ""),
    };

    // 按键分组，保持键的首次出现顺序
    let mut groups: Vec<(String, Vec<String>)> = Vec::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        if value.is_empty() || TRACKING_PARAMS.contains(&key.as_ref()) {
            continue;
        }
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value.into_owned()),
            None => groups.push((key.into_owned(), vec![value.into_owned()])),
        }
    }

    let mut cleaned = base.to_string();
    if !groups.is_empty() {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, values) in &groups {
            for value in values {
                serializer.append_pair(key, value);
            }
        }
        cleaned.push('?');
        cleaned.push_str(&serializer.finish());
    }
    if let Some(frag) = fragment {
        if !frag.is_empty() {
            cleaned.push('#');
            cleaned.push_str(frag);
        }
    }
    cleaned
}
