//! # Markdown Paper Translator
//!
//! 面向学术 Markdown 文档的翻译库：在调用大模型翻译之前保护公式、表格、代码块、
//! HTML 和图片引用，按段落分块以满足接口长度限制，翻译后再原样恢复这些元素。
//!
//! ## 主要特性
//!
//! - **元素保护**: 公式、表格、代码块、图片替换为 `[PROTECTED_ELEMENT_n]` 占位符
//! - **段落分块**: 按空行切分并合并段落，单块不超过配置的字符数
//! - **顺序翻译**: 逐块请求，请求之间保持固定间隔
//! - **失败降级**: 单块失败不重试，保留原文，整篇文档总能输出
//! - **配置灵活**: 支持TOML配置文件和环境变量
//!
//! ## 快速开始
//!
//! ```rust
//! use md_paper_translator::{chunk_text, protect, restore};
//!
//! let text = "Intro.\n\n$E=mc^2$\n\nMore text.\n\n| a | b |\n|---|---|\n| 1 | 2 |\n";
//! let protected = protect(text);
//! assert_eq!(protected.spans.len(), 2);
//!
//! let chunks = chunk_text(&protected.sanitized, 4000);
//! assert_eq!(chunks.len(), 1);
//!
//! // 这里省略了真正的翻译
//! assert_eq!(restore(&chunks[0].text, &protected.spans), text);
//! ```
//!
//! ## 配置文件支持
//!
//! ```toml
//! [translation]
//! target_lang = "Chinese"
//! api_url = "https://api.openai.com/v1/chat/completions"
//! model = "gpt-4-turbo"
//! temperature = 0.1
//! max_tokens = 4096
//! max_text_length = 4000
//! request_interval_ms = 1000
//! max_concurrent_requests = 1
//! request_timeout_secs = 120
//! substitution_mode = "first_occurrence"
//! ```

pub mod chunker;
pub mod completion;
pub mod config;
pub mod error;
pub mod mock;
pub mod protector;
pub mod translator;
pub mod types;

pub use chunker::chunk_text;
pub use completion::{CompletionService, OpenAiCompletionService};
pub use config::TranslationLibConfig;
pub use error::{Result, TranslationError};
pub use mock::{MockCompletionService, MockMode};
pub use protector::{missing_placeholders, protect, protect_with_mode, restore};
pub use translator::{default_output_path, reassemble, RateLimiter, TranslationService};
pub use types::{
    placeholder, Chunk, DocumentTranslation, ProtectedSpan, ProtectedText, SubstitutionMode,
    TranslatedChunk, TranslationConfig,
};
