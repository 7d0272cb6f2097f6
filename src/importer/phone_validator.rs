// ==========================================
// 线索工具 - 电话号码校验器
// ==========================================
// 职责: 原始电话片段 → 11 位规范号码（首位 7），否则 None
// 红线: 全函数（不 panic、不报错），结果确定
// ==========================================

use once_cell::sync::Lazy;
use regex::Regex;

/// 科学计数法还原的数值下界（不含）
pub const DEFAULT_MIN_MAGNITUDE: f64 = 1e9;
/// 科学计数法还原的数值上界（不含）
pub const DEFAULT_MAX_MAGNITUDE: f64 = 9e11;

static NON_DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9]").unwrap());

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhoneValidator {
    min_magnitude: f64,
    max_magnitude: f64,
}

impl Default for PhoneValidator {
    fn default() -> Self {
        Self {
            min_magnitude: DEFAULT_MIN_MAGNITUDE,
            max_magnitude: DEFAULT_MAX_MAGNITUDE,
        }
    }
}

impl PhoneValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 自定义科学计数法量级范围
    pub fn with_bounds(min_magnitude: f64, max_magnitude: f64) -> Self {
        Self {
            min_magnitude,
            max_magnitude,
        }
    }

    /// 规范化电话号码
    ///
    /// # 规则（按顺序，任一步失败即返回 None）
    /// 1. 缺失/空串/"nan"/"none" → None
    /// 2. 去掉结尾 ".0"
    /// 3. 含 e+/e- → 按浮点解析，量级越界则拒绝，四舍五入为整数串
    /// 4. 去掉所有非数字字符
    /// 5. 少于 10 位 → None
    /// 6. 恰好 10 位 → 前补 7
    /// 7. 不是 11 位 → None
    /// 8. 首位 8 → 改为 7
    /// 9. 首位不是 7 → None
    pub fn clean(&self, raw: Option<&str>) -> Option<String> {
        let token = raw?.trim();
        if is_null_like(token) {
            return None;
        }

        let mut token = token.strip_suffix(".0").unwrap_or(token).to_string();

        let lower = token.to_lowercase();
        if lower.contains("e+") || lower.contains("e-") {
            token = self.expand_scientific(&token)?;
        }

        let mut digits = NON_DIGIT.replace_all(&token, "").into_owned();
        if digits.len() < 10 {
            return None;
        }
        if digits.len() == 10 {
            digits.insert(0, '7');
        }
        if digits.len() != 11 {
            return None;
        }
        if digits.starts_with('8') {
            digits.replace_range(..1, "7");
        }
        if !digits.starts_with('7') {
            return None;
        }

        Some(digits)
    }

    /// 便捷入口：直接接收 &str
    pub fn clean_str(&self, raw: &str) -> Option<String> {
        self.clean(Some(raw))
    }

    fn expand_scientific(&self, token: &str) -> Option<String> {
        let value: f64 = match token.trim().parse() {
            Ok(v) => v,
            Err(e) => {
                tracing::debug!(token = %token, error = %e, "科学计数法解析失败");
                return None;
            }
        };
        if !value.is_finite() || value < self.min_magnitude || value > self.max_magnitude {
            return None;
        }
        let expanded = format!("{:.0}", value.round());
        tracing::debug!(from = %token, to = %expanded, "科学计数法已还原");
        Some(expanded)
    }
}

/// 空值判定（空串 / nan / none，不区分大小写）
pub fn is_null_like(value: &str) -> bool {
    let v = value.trim();
    v.is_empty() || v.eq_ignore_ascii_case("nan") || v.eq_ignore_ascii_case("none")
}

/// 展示格式: +7 (XXX) XXX-XX-XX；非 11 位原样返回
pub fn format_phone_for_display(phone: &str) -> String {
    if phone.chars().count() != 11 || !phone.is_ascii() {
        return phone.to_string();
    }
    format!(
        "+7 ({}) {}-{}-{}",
        &phone[1..4],
        &phone[4..7],
        &phone[7..9],
        &phone[9..11]
    )
}
