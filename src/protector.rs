//! 特殊元素保护模块
//!
//! 在翻译之前把公式、HTML、表格、代码块和图片引用替换为占位符，
//! 翻译完成后再按编号把原文放回去。

use crate::types::{placeholder, ProtectedSpan, ProtectedText, SubstitutionMode};
use once_cell::sync::Lazy;
use regex::Regex;

/// 合并后的匹配模式
///
/// 各分支按优先级排列，匹配时取最靠左的起点，起点相同时取排在前面的分支。
/// `(?s:...)` 显式允许 `.` 匹配换行，`.*?` 显式取最短匹配；表格的每一行
/// 只占一行，因此用 `[^\r\n]` 代替 `.`。
static PROTECTED_PATTERN: Lazy<Regex> = Lazy::new(|| {
    let patterns = [
        // 块级公式 $$...$$，然后是行内公式 $...$
        r"(?s:\$\$.*?\$\$|\$.*?\$)",
        // HTML 块
        r"(?s:<html>.*?</html>)",
        // Markdown 表格：表头、分隔行、至少一行表体
        r"\|[^\r\n]*\|(?:\r\n|\r|\n)\|[-:| ]+\|(?:(?:\r\n|\r|\n)\|[^\r\n]*\|)+",
        // 代码块
        r"(?s:```.*?```)",
        // 图片引用
        r"(?s:!\[.*?\]\(.*?\))",
    ];
    Regex::new(&patterns.join("|")).expect("protected element pattern must compile")
});

/// 使用默认的首次出现替换策略保护特殊元素
///
/// # 示例
///
/// ```rust
/// use md_paper_translator::protector::{protect, restore};
///
/// let text = "Energy: $E=mc^2$.";
/// let protected = protect(text);
/// assert_eq!(protected.sanitized, "Energy: [PROTECTED_ELEMENT_0].");
/// assert_eq!(restore(&protected.sanitized, &protected.spans), text);
/// ```
pub fn protect(text: &str) -> ProtectedText {
    protect_with_mode(text, SubstitutionMode::FirstOccurrence)
}

/// Extract protected elements and replace them with placeholders.
///
/// With `SubstitutionMode::FirstOccurrence` each match is substituted by
/// searching the working text for its first remaining occurrence, so two
/// byte-identical elements rely on textual order to pair up. With
/// `SubstitutionMode::Offset` the sanitized text is assembled from the match
/// ranges directly.
pub fn protect_with_mode(text: &str, mode: SubstitutionMode) -> ProtectedText {
    let matches: Vec<_> = PROTECTED_PATTERN.find_iter(text).collect();
    if matches.is_empty() {
        return ProtectedText {
            sanitized: text.to_string(),
            spans: Vec::new(),
        };
    }

    let spans: Vec<ProtectedSpan> = matches
        .iter()
        .enumerate()
        .map(|(index, m)| ProtectedSpan {
            index,
            original_text: m.as_str().to_string(),
        })
        .collect();

    let sanitized = match mode {
        SubstitutionMode::FirstOccurrence => {
            let mut working = text.to_string();
            for span in &spans {
                working = working.replacen(&span.original_text, &span.placeholder(), 1);
            }
            working
        }
        SubstitutionMode::Offset => {
            let mut out = String::with_capacity(text.len());
            let mut last_end = 0;
            for (index, m) in matches.iter().enumerate() {
                out.push_str(&text[last_end..m.start()]);
                out.push_str(&placeholder(index));
                last_end = m.end();
            }
            out.push_str(&text[last_end..]);
            out
        }
    };

    ProtectedText { sanitized, spans }
}

/// 恢复特殊元素
///
/// 按编号顺序把每个占位符第一次出现的位置替换回原文。占位符缺失时
/// 对应的元素不会被恢复，也不会报错，可以先用 [`missing_placeholders`] 检查。
pub fn restore(translated_text: &str, spans: &[ProtectedSpan]) -> String {
    let mut text = translated_text.to_string();
    for span in spans {
        text = text.replacen(&span.placeholder(), &span.original_text, 1);
    }
    text
}

/// 返回在文本中找不到占位符的元素编号
pub fn missing_placeholders(translated_text: &str, spans: &[ProtectedSpan]) -> Vec<usize> {
    spans
        .iter()
        .filter(|span| !translated_text.contains(&span.placeholder()))
        .map(|span| span.index)
        .collect()
}
