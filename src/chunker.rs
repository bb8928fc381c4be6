//! 文本分块模块
//!
//! 按空行把文本切成段落，再把相邻段落合并成不超过长度上限的文本块。

use crate::types::Chunk;
use once_cell::sync::Lazy;
use regex::Regex;

/// 段落之间的连接符
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// 一个换行、任意空白、再一个换行，兼容 `\n`、`\r\n` 和 `\r`
static PARAGRAPH_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:\r\n|\r|\n)\s*(?:\r\n|\r|\n)").expect("paragraph break pattern must compile"));

/// 按空行切分段落
pub fn split_paragraphs(text: &str) -> Vec<&str> {
    PARAGRAPH_BREAK.split(text).collect()
}

/// 将文本分成适合 API 调用的块
///
/// 长度按字符数计算。追加下一个段落（含连接符）会超过 `max_length` 且当前块
/// 非空时，先输出当前块。单个段落本身超过上限时单独成块，不再继续切分。
///
/// # 示例
///
/// ```rust
/// use md_paper_translator::chunker::chunk_text;
///
/// let chunks = chunk_text("aaaa\n\nbbbb\n\ncccc", 10);
/// let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
/// assert_eq!(texts, vec!["aaaa\n\nbbbb", "cccc"]);
/// ```
pub fn chunk_text(text: &str, max_length: usize) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;
    let separator_len = PARAGRAPH_SEPARATOR.chars().count();

    for paragraph in split_paragraphs(text) {
        let paragraph_len = paragraph.chars().count();

        if !current.is_empty() && current_len + separator_len + paragraph_len > max_length {
            chunks.push(Chunk {
                sequence_position: chunks.len(),
                text: std::mem::take(&mut current),
            });
            current.push_str(paragraph);
            current_len = paragraph_len;
        } else if current.is_empty() {
            current.push_str(paragraph);
            current_len = paragraph_len;
        } else {
            current.push_str(PARAGRAPH_SEPARATOR);
            current.push_str(paragraph);
            current_len += separator_len + paragraph_len;
        }
    }

    if !current.is_empty() {
        chunks.push(Chunk {
            sequence_position: chunks.len(),
            text: current,
        });
    }

    chunks
}

/// 用段落连接符拼接文本块
pub fn join_chunks<'a, I>(texts: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    texts.into_iter().collect::<Vec<_>>().join(PARAGRAPH_SEPARATOR)
}
