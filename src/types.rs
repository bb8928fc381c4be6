//! 类型定义模块
//!
//! 定义翻译库中使用的所有数据结构和配置类型。

use serde::{Deserialize, Serialize};

/// 占位符的前缀，完整形式为 `[PROTECTED_ELEMENT_{index}]`
pub const PLACEHOLDER_PREFIX: &str = "[PROTECTED_ELEMENT_";

/// 生成第 `index` 个受保护元素的占位符
pub fn placeholder(index: usize) -> String {
    format!("{}{}]", PLACEHOLDER_PREFIX, index)
}

/// 翻译配置
///
/// 包含翻译服务的所有配置选项，如API地址、模型参数、分块和节流设置等。
///
/// # 字段说明
///
/// * `target_lang` - 目标语言，直接写入提示词，例如 "Chinese" 或 "中文"
/// * `api_url` - OpenAI 兼容的 chat completions 地址
/// * `api_key` - API 密钥，未配置时从 `OPENAI_API_KEY` 读取
/// * `model` - 模型名称
/// * `temperature` - 采样温度
/// * `max_tokens` - 单次请求的最大输出 token 数
/// * `max_text_length` - 单个文本块的最大字符数
/// * `request_interval_ms` - 相邻两次请求之间的固定间隔
/// * `max_concurrent_requests` - 最大并发请求数，1 表示严格顺序
/// * `request_timeout_secs` - HTTP 请求超时时间
/// * `substitution_mode` - 占位符替换策略
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// 目标语言
    pub target_lang: String,
    /// Chat completions API 地址
    pub api_url: String,
    /// API 密钥
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// 模型名称
    pub model: String,
    /// 采样温度
    pub temperature: f32,
    /// 最大输出 token 数
    pub max_tokens: u32,
    /// 单个文本块的最大字符数
    pub max_text_length: usize,
    /// 请求间隔（毫秒）
    pub request_interval_ms: u64,
    /// 最大并发请求数
    pub max_concurrent_requests: usize,
    /// 请求超时（秒）
    pub request_timeout_secs: u64,
    /// 占位符替换策略
    pub substitution_mode: SubstitutionMode,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            target_lang: "Chinese".to_string(),
            api_url: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: None,
            model: "gpt-4-turbo".to_string(),
            temperature: 0.1,
            max_tokens: 4096,
            max_text_length: 4000,
            request_interval_ms: 1000,
            max_concurrent_requests: 1,
            request_timeout_secs: 120,
            substitution_mode: SubstitutionMode::FirstOccurrence,
        }
    }
}

/// 占位符替换策略
///
/// `FirstOccurrence` 按文本查找第一次出现的位置进行替换，内容完全相同的两个
/// 元素可能被替换到错误的位置。`Offset` 直接使用匹配的字节区间，不存在该问题。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubstitutionMode {
    /// 按首次出现的文本替换（默认）
    #[default]
    FirstOccurrence,
    /// 按匹配位置替换
    Offset,
}

/// 受保护的元素（公式、表格、代码块、图片等）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedSpan {
    /// 在原文中按出现顺序的编号
    pub index: usize,
    /// 原始文本
    pub original_text: String,
}

impl ProtectedSpan {
    /// 该元素对应的占位符
    pub fn placeholder(&self) -> String {
        placeholder(self.index)
    }
}

/// 保护处理的结果：替换后的文本和按编号排列的原始元素
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedText {
    pub sanitized: String,
    pub spans: Vec<ProtectedSpan>,
}

/// 按段落对齐的文本块
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// 在输出序列中的位置
    pub sequence_position: usize,
    pub text: String,
}

/// 单个文本块的翻译结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedChunk {
    pub sequence_position: usize,
    pub text: String,
    /// 为 `false` 时 `text` 是未翻译的原文
    pub translated: bool,
}

/// 整篇文档的翻译结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentTranslation {
    /// 恢复占位符之后的最终文本
    pub text: String,
    /// 文本块总数
    pub chunk_count: usize,
    /// 翻译失败、保留原文的文本块位置
    pub failed_chunks: Vec<usize>,
    /// 翻译结果中缺失占位符的元素编号，这些元素没有被恢复
    pub missing_placeholders: Vec<usize>,
}

impl DocumentTranslation {
    /// 是否所有文本块都翻译成功且所有元素都已恢复
    pub fn is_complete(&self) -> bool {
        self.failed_chunks.is_empty() && self.missing_placeholders.is_empty()
    }
}

/// OpenAI 兼容的对话消息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Chat completions 请求体
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Chat completions 响应体
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}
