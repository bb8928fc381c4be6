//! 错误处理模块
//!
//! 定义翻译库中使用的错误类型和错误处理机制。

use std::path::PathBuf;
use thiserror::Error;

/// 翻译错误类型
///
/// 包含翻译过程中可能出现的各种错误情况。只有文件读写和配置错误会终止
/// 整个流程，单个文本块的服务错误由编排器降级处理。
///
/// # 变体说明
///
/// * `Http` - HTTP请求错误
/// * `Custom` - 自定义错误消息
/// * `RateLimitError` - 速率限制错误
/// * `ApiError` - API响应错误，包含错误代码和消息
/// * `ParseError` - 解析错误
/// * `Io` - 文件读写错误
/// * `Config` - 配置校验错误
#[derive(Debug, Error)]
pub enum TranslationError {
    /// HTTP请求错误
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// 自定义错误消息
    #[error("{0}")]
    Custom(String),
    /// 速率限制错误
    #[error("Rate limit error: {0}")]
    RateLimitError(String),
    /// API响应错误
    #[error("API error {code}: {message}")]
    ApiError {
        /// 错误代码
        code: i32,
        /// 错误消息
        message: String,
    },
    /// 解析错误
    #[error("Parse error: {0}")]
    ParseError(String),
    /// 文件读写错误
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// 出错的文件路径
        path: PathBuf,
        /// 底层错误
        #[source]
        source: std::io::Error,
    },
    /// 配置错误
    #[error("Config error: {0}")]
    Config(String),
    /// TOML 解析错误
    #[error("Invalid TOML: {0}")]
    TomlDe(#[from] toml::de::Error),
    /// TOML 序列化错误
    #[error("Failed to serialize TOML: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl TranslationError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TranslationError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<String> for TranslationError {
    fn from(error: String) -> Self {
        TranslationError::Custom(error)
    }
}

impl From<&str> for TranslationError {
    fn from(error: &str) -> Self {
        TranslationError::Custom(error.to_string())
    }
}

/// 翻译结果类型别名
///
/// 简化返回类型，使用 `TranslationError` 作为错误类型。
///
/// # 示例
///
/// ```rust
/// use md_paper_translator::{Result, TranslationError};
///
/// fn example_function() -> Result<String> {
///     Ok("Success".to_string())
/// }
///
/// fn failing_function() -> Result<String> {
///     Err(TranslationError::from("boom"))
/// }
///
/// assert!(example_function().is_ok());
/// assert_eq!(failing_function().unwrap_err().to_string(), "boom");
/// ```
pub type Result<T> = std::result::Result<T, TranslationError>;
