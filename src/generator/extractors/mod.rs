//! 结构化信号提取器
//!
//! 对生成文本做纯文本模式匹配：标题、加粗片段、参考文献块、缺口主题、
//! 推荐意见摘要。全部为纯函数，"没找到"返回空结果或确定性兜底值，
//! 从不向调用方抛错。

use regex::Regex;
use std::sync::LazyLock;

static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^### ([^\n]+)$").unwrap());
static BOLD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").unwrap());
static REFERENCES_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^###? References[ \t]*$").unwrap());
static NUMBERED_REF_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.\s+.+").unwrap());
static BRACKETED_REF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[\d+\]\s+.+").unwrap());
static PUBLICATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Original Publication: (\w+ \d{4}) by ([^|]+)").unwrap());
static TABLE_ROW_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\|.*\|.*\|").unwrap());
static NUMBERED_LINE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.\s+").unwrap());
static NUMBERED_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^### (\d+\.\s+[^\n]+)$").unwrap());

/// 缺口主题兜底集合，提取结果不足2条时整体替换
pub const GAP_TOPIC_FALLBACKS: [&str; 3] = [
    "Implementation Strategies",
    "Special Populations",
    "New Technologies",
];

/// 缺口主题数量上限
const MAX_GAP_TOPICS: usize = 5;

/// 推荐意见摘要行数上限
const MAX_DIGEST_RECOMMENDATIONS: usize = 10;

/// 提取三级标题，按首次出现顺序，保留重复
pub fn extract_headings(text: &str) -> Vec<String> {
    HEADING_RE
        .captures_iter(text)
        .map(|cap| cap[1].to_string())
        .collect()
}

/// 提取加粗片段，按首次出现顺序，保留重复
pub fn extract_bold_spans(text: &str) -> Vec<String> {
    BOLD_RE
        .captures_iter(text)
        .map(|cap| cap[1].to_string())
        .collect()
}

/// 从缺口分析文本中提取缺口主题
///
/// 过滤长度不超过5个字符的片段和含"Gap Area"的结构性标签；
/// 有效主题不足2条时替换为兜底集合；上限5条，保持出现顺序。
pub fn extract_gap_topics(text: &str) -> Vec<String> {
    let mut topics: Vec<String> = extract_bold_spans(text)
        .into_iter()
        .filter(|span| span.chars().count() > 5 && !span.contains("Gap Area"))
        .collect();

    if topics.len() < 2 {
        topics = GAP_TOPIC_FALLBACKS.iter().map(|s| s.to_string()).collect();
    }

    topics.truncate(MAX_GAP_TOPICS);
    topics
}

/// 按首个"References"标题（二级或三级）把文本切分为正文和参考文献块
///
/// 参考文献块不含标题行本身；没有该标题时正文即全文，参考文献块为空。
pub fn split_references(text: &str) -> (String, String) {
    match REFERENCES_HEADING_RE.find(text) {
        Some(m) => {
            let body = text[..m.start()].to_string();
            let block = text[m.end()..].trim_start_matches('\n').to_string();
            (body, block)
        }
        None => (text.to_string(), String::new()),
    }
}

/// 去掉文本中内嵌的参考文献块，保留正文
pub fn strip_references(text: &str) -> String {
    split_references(text).0
}

/// 逐行扫描编号引用（"1. ..." 或 "[1] ..."），排除带加粗标记的
/// 推荐意见编号行以避免误报。仅在没有任何阶段产出显式参考文献块时
/// 作为兜底路径使用。
pub fn extract_numbered_references(text: &str) -> Vec<String> {
    let mut references = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if !(NUMBERED_REF_RE.is_match(trimmed) || BRACKETED_REF_RE.is_match(trimmed)) {
            continue;
        }
        // 形如 1. **"..."** 的行是推荐意见编号，不是引用
        if trimmed.contains("**") {
            continue;
        }
        if seen.insert(trimmed.to_string()) {
            references.push(trimmed.to_string());
        }
    }

    references
}

/// 合并多个参考文献块，按行去重（首次出现保留，顺序稳定）
///
/// 已知限制：只按行的精确相等去重，格式略有差异的近重复引用不会被合并。
pub fn combine_references(blocks: &[String]) -> String {
    let combined = blocks
        .iter()
        .filter(|block| !block.is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join("\n\n");

    if combined.is_empty() {
        return String::new();
    }

    let mut unique_lines = Vec::new();
    let mut seen = std::collections::HashSet::new();
    for line in combined.lines() {
        if !line.trim().is_empty() && seen.insert(line.to_string()) {
            unique_lines.push(line.to_string());
        }
    }

    unique_lines.join("\n")
}

/// 标题到目录锚点：小写、空格转连字符、去掉圆括号
pub fn heading_anchor(heading: &str) -> String {
    heading
        .to_lowercase()
        .replace(' ', "-")
        .replace(['(', ')'], "")
}

/// 从元数据与章节汇总中提炼要点摘要，用于为结论调用提供上下文。
/// 纯文本分析，不触发外部调用。
pub fn key_points_digest(metadata: &str, sections_summary: &str) -> String {
    let mut key_points = String::from("Key points from previous sections:\n");

    if let Some(cap) = PUBLICATION_RE.captures(metadata) {
        key_points.push_str(&format!(
            "- Original guidelines published {} by {}\n",
            &cap[1],
            cap[2].trim()
        ));
    }

    let section_names = extract_headings(sections_summary);
    if !section_names.is_empty() {
        key_points.push_str(&format!(
            "- Updated sections include: {}\n",
            section_names.join(", ")
        ));
    }

    let bold_changes = extract_bold_spans(sections_summary);
    if !bold_changes.is_empty() {
        if bold_changes.len() <= 10 {
            key_points.push_str(&format!(
                "- Key changes include: {}\n",
                bold_changes
                    .iter()
                    .take(5)
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        } else {
            key_points.push_str(&format!(
                "- Approximately {} significant changes have been made across all sections\n",
                bold_changes.len()
            ));
        }
    }

    key_points
}

/// 从章节汇总中提炼承载推荐意见的行，用于为场景适配调用提供上下文
///
/// 优先取含加粗标记的表格行（跳过表头），否则取编号列表行；上限10条。
/// 什么都没找到时退化为一行通用主题摘要。
pub fn recommendation_digest(sections_content: &str) -> String {
    let mut recommendations: Vec<String> = Vec::new();

    for line in sections_content.lines() {
        if !TABLE_ROW_RE.is_match(line) {
            continue;
        }
        if line.contains("Updated Recommendation") || line.contains("Grade") {
            continue;
        }
        if line.contains("**") {
            recommendations.push(line.trim().to_string());
        }
    }

    if recommendations.is_empty() {
        for line in sections_content.lines() {
            if NUMBERED_LINE_RE.is_match(line.trim()) {
                recommendations.push(line.trim().to_string());
            }
        }
    }

    recommendations.truncate(MAX_DIGEST_RECOMMENDATIONS);

    if !recommendations.is_empty() {
        return format!(
            "Key recommendations from the guidelines:\n\n{}",
            recommendations.join("\n")
        );
    }

    // 兜底：一行通用摘要
    let summary = match sections_content.split_once("###") {
        Some((before, _)) if !before.trim().is_empty() => before.trim().to_string(),
        _ => "the medical topic".to_string(),
    };
    format!("Guidelines for {}", summary)
}

/// 提取形如 "### 1. Resource-Limited Settings" 的带编号三级标题，
/// 返回去掉编号后的标题文本（场景适配章节的目录条目）
pub fn extract_numbered_headings(text: &str) -> Vec<String> {
    NUMBERED_HEADING_RE
        .captures_iter(text)
        .filter_map(|cap| {
            cap[1].split_once('.')
                .map(|(_, rest)| rest.trim().to_string())
        })
        .collect()
}

// Include tests
#[cfg(test)]
mod tests;
