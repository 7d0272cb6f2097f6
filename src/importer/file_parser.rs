// ==========================================
// 线索工具 - 文件解析器实现
// ==========================================
// 支持: CSV（分隔符未知，按候选方案依次尝试）/ Excel (.xlsx/.xls)
// 分隔符策略: 有序候选列表，首个"列数达标"的方案胜出
// ==========================================

use crate::domain::table::{Row, Table};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::lead_importer_trait::FileParser;
use calamine::{open_workbook_auto, Reader};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

// ==========================================
// 解析方案
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelimiterChoice {
    /// 固定分隔符
    Fixed(u8),
    /// 根据内容推断
    Inferred,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseAttempt {
    pub label: &'static str,
    pub delimiter: DelimiterChoice,
    /// 最少列数（不满足视为本方案失败）
    pub min_columns: usize,
    /// 非 UTF-8 字节是否按替换字符容忍
    pub lossy: bool,
}

impl ParseAttempt {
    const fn strict(label: &'static str, delimiter: DelimiterChoice, min_columns: usize) -> Self {
        Self {
            label,
            delimiter,
            min_columns,
            lossy: false,
        }
    }

    /// 最后兜底: 逗号 + 去 BOM + 容忍编码，接受任意列数
    const fn fallback() -> Self {
        Self {
            label: "默认(BOM)",
            delimiter: DelimiterChoice::Fixed(b','),
            min_columns: 1,
            lossy: true,
        }
    }
}

/// 线索源文件: TAB → 逗号 → 分号 → 竖线 → 推断 → 兜底
pub const LEAD_SOURCE_ATTEMPTS: [ParseAttempt; 6] = [
    ParseAttempt::strict("TAB", DelimiterChoice::Fixed(b'\t'), 2),
    ParseAttempt::strict("逗号", DelimiterChoice::Fixed(b','), 2),
    ParseAttempt::strict("分号", DelimiterChoice::Fixed(b';'), 2),
    ParseAttempt::strict("竖线", DelimiterChoice::Fixed(b'|'), 2),
    ParseAttempt::strict("自动推断", DelimiterChoice::Inferred, 2),
    ParseAttempt::fallback(),
];

/// CRM 导出文件: 逗号 → 分号 → TAB（要求多于 5 列）→ TAB（至少 2 列）→ 兜底
pub const CRM_EXPORT_ATTEMPTS: [ParseAttempt; 5] = [
    ParseAttempt::strict("逗号", DelimiterChoice::Fixed(b','), 6),
    ParseAttempt::strict("分号", DelimiterChoice::Fixed(b';'), 6),
    ParseAttempt::strict("TAB", DelimiterChoice::Fixed(b'\t'), 6),
    // 列数较少的 TAB 导出
    ParseAttempt::strict("TAB(少列)", DelimiterChoice::Fixed(b'\t'), 2),
    ParseAttempt::fallback(),
];

/// 按候选方案依次解析，返回首个成功的表及其方案
pub fn sniff_and_parse<'a>(
    bytes: &[u8],
    attempts: &'a [ParseAttempt],
) -> ImportResult<(Table, &'a ParseAttempt)> {
    let mut last_error = None;

    for attempt in attempts {
        match parse_with(bytes, attempt) {
            Ok(table) if table.columns().len() >= attempt.min_columns => {
                debug!(attempt = attempt.label, columns = table.columns().len(), "分隔符方案命中");
                return Ok((table, attempt));
            }
            Ok(table) => {
                debug!(attempt = attempt.label, columns = table.columns().len(), "列数不足，尝试下一方案");
            }
            Err(e) => {
                debug!(attempt = attempt.label, error = %e, "分隔符方案失败");
                last_error = Some(e);
            }
        }
    }

    Err(ImportError::UnreadableFile(
        last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "所有分隔符方案均失败".to_string()),
    ))
}

/// 单个方案解析
pub fn parse_with(bytes: &[u8], attempt: &ParseAttempt) -> ImportResult<Table> {
    let text = if attempt.lossy {
        String::from_utf8_lossy(bytes).into_owned()
    } else {
        std::str::from_utf8(bytes)
            .map_err(|e| ImportError::EncodingError(e.to_string()))?
            .to_string()
    };
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

    let delimiter = match attempt.delimiter {
        DelimiterChoice::Fixed(d) => d,
        DelimiterChoice::Inferred => infer_delimiter(text),
    };

    parse_text(text, delimiter)
}

/// 以指定分隔符解析文本
///
/// - 字段多于表头的行: 跳过（坏行）
/// - 字段少于表头的行: 缺失部分视为空
/// - 全空行: 跳过
pub fn parse_text(text: &str, delimiter: u8) -> ImportResult<Table> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = dedupe_headers(reader.headers()?.iter());
    if headers.is_empty() || (headers.len() == 1 && headers[0].starts_with("Unnamed")) {
        return Err(ImportError::UnreadableFile("文件无表头".to_string()));
    }

    let mut table = Table::new(headers.clone());
    let mut bad_lines = 0usize;

    for result in reader.records() {
        let record = result?;
        if record.len() > headers.len() {
            bad_lines += 1;
            continue;
        }

        let mut row = Row::new();
        for (idx, value) in record.iter().enumerate() {
            row.set(&headers[idx], normalize_cell(value));
        }
        if row.is_blank() {
            continue;
        }
        table.push_row(row);
    }

    if bad_lines > 0 {
        warn!(bad_lines, "跳过字段数多于表头的行");
    }
    Ok(table)
}

/// 表头清洗: TRIM；空列名 → "Unnamed: N"；重名 → "name.1"、"name.2"
fn dedupe_headers<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut headers = Vec::new();

    for (idx, h) in raw.enumerate() {
        let base = match h.trim() {
            "" => format!("Unnamed: {}", idx),
            t => t.to_string(),
        };
        let name = match seen.get(&base).copied() {
            None => base.clone(),
            Some(n) => format!("{}.{}", base, n),
        };
        *seen.entry(base).or_insert(0) += 1;
        headers.push(name);
    }
    headers
}

fn normalize_cell(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// 常见分隔符优先（同分时靠前者胜）
const PREFERRED_DELIMITERS: [u8; 7] = [b',', b';', b'\t', b'|', b':', b'^', b' '];

/// 推断分隔符
///
/// 候选: 表头中出现的空白/标点字节（排除引号与常见词内字符 `_ . -`），
/// 且在前 10 行的每一行都出现。按"平均出现次数 / (1 + 标准差)"打分，分高者胜；
/// 无候选时返回逗号
pub fn infer_delimiter(content: &str) -> u8 {
    let sample: Vec<&str> = content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(10)
        .collect();
    let Some(header) = sample.first() else {
        return b',';
    };

    let mut candidates: Vec<u8> = PREFERRED_DELIMITERS.to_vec();
    for b in header.bytes() {
        let usable = (b.is_ascii_punctuation() || b == b' ' || b == b'\t')
            && !matches!(b, b'"' | b'\'' | b'_' | b'.' | b'-');
        if usable && !candidates.contains(&b) {
            candidates.push(b);
        }
    }

    let mut best = b',';
    let mut best_score = 0.0f32;

    for delimiter in candidates {
        let counts: Vec<usize> = sample
            .iter()
            .map(|line| line.bytes().filter(|&b| b == delimiter).count())
            .collect();
        if counts.iter().any(|&c| c == 0) {
            continue;
        }

        let avg = counts.iter().sum::<usize>() as f32 / counts.len() as f32;
        let variance = counts
            .iter()
            .map(|&x| (x as f32 - avg).powi(2))
            .sum::<f32>()
            / counts.len() as f32;
        let score = avg / (1.0 + variance.sqrt());

        if score > best_score {
            best_score = score;
            best = delimiter;
        }
    }

    debug!(delimiter = %(best as char).escape_default(), score = best_score, "分隔符推断完成");
    best
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser {
    attempts: &'static [ParseAttempt],
}

impl CsvParser {
    /// 线索源文件解析器
    pub fn for_lead_sources() -> Self {
        Self {
            attempts: &LEAD_SOURCE_ATTEMPTS,
        }
    }

    /// CRM 导出文件解析器
    pub fn for_crm_exports() -> Self {
        Self {
            attempts: &CRM_EXPORT_ATTEMPTS,
        }
    }

    /// 解析内存中的 CSV 文本（如采集服务下载结果）
    pub fn parse_content(&self, content: &str) -> ImportResult<Table> {
        let (table, attempt) = sniff_and_parse(content.as_bytes(), self.attempts)?;
        info!(attempt = attempt.label, columns = table.columns().len(), rows = table.len(), "内容解析完成");
        Ok(table)
    }
}

impl Default for CsvParser {
    fn default() -> Self {
        Self::for_lead_sources()
    }
}

impl FileParser for CsvParser {
    fn parse_table(&self, file_path: &Path) -> ImportResult<Table> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }

        let bytes = std::fs::read(file_path)?;
        let (table, attempt) = sniff_and_parse(&bytes, self.attempts)?;

        if attempt.min_columns <= 1 {
            warn!(file = %file_path.display(), "文件已读取，但结构可能不正确");
        } else {
            info!(file = %file_path.display(), attempt = attempt.label, "文件分隔符已识别");
        }
        info!(columns = table.columns().len(), rows = table.len(), "文件解析完成");

        Ok(table)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_table(&self, file_path: &Path) -> ImportResult<Table> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }

        let mut workbook = open_workbook_auto(file_path)?;

        // 读取第一个 sheet
        let sheet_names = workbook.sheet_names();
        let sheet_name = sheet_names
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;
        let range = workbook.worksheet_range(&sheet_name)?;

        let mut rows = range.rows();
        let header_row = rows
            .next()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无数据行".to_string()))?;
        let header_cells: Vec<String> = header_row.iter().map(|c| c.to_string()).collect();
        let headers = dedupe_headers(header_cells.iter().map(|s| s.as_str()));

        let mut table = Table::new(headers.clone());
        for data_row in rows {
            let mut row = Row::new();
            for (idx, cell) in data_row.iter().enumerate() {
                if let Some(header) = headers.get(idx) {
                    row.set(header, normalize_cell(&cell.to_string()));
                }
            }
            if row.is_blank() {
                continue;
            }
            table.push_row(row);
        }

        Ok(table)
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser {
    csv: CsvParser,
}

impl UniversalFileParser {
    pub fn new(csv: CsvParser) -> Self {
        Self { csv }
    }

    pub fn parse<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<Table> {
        let path = file_path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "xlsx" | "xls" => ExcelParser.parse_table(path),
            "csv" | "tsv" | "txt" | "" => self.csv.parse_table(path),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}

impl Default for UniversalFileParser {
    fn default() -> Self {
        Self::new(CsvParser::for_lead_sources())
    }
}

impl FileParser for UniversalFileParser {
    fn parse_table(&self, file_path: &Path) -> ImportResult<Table> {
        self.parse(file_path)
    }
}
