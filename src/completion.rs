//! 文本补全服务模块
//!
//! 把大模型接口抽象成“系统指令 + 用户内容 -> 一段文本”的服务，
//! 并提供 OpenAI 兼容 chat completions 接口的实现。

use crate::error::{Result, TranslationError};
use crate::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, TranslationConfig};
use async_trait::async_trait;
use log::{debug, error, warn};
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// 文本补全服务
///
/// 失败时返回错误即可，是否降级由调用方决定。
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Send one system instruction and one user message, return the completion text.
    async fn complete(&self, system: &str, user: &str) -> Result<String>;
}

/// OpenAI 兼容的 chat completions 客户端
#[derive(Clone)]
pub struct OpenAiCompletionService {
    /// HTTP客户端，用于API调用
    client: Client,
    api_url: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiCompletionService {
    /// 根据翻译配置创建客户端
    pub fn new(config: &TranslationConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .pool_idle_timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(5)
            .tcp_keepalive(Duration::from_secs(60))
            .user_agent(concat!("md-paper-translator/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to create configured HTTP client: {}, using default", e);
                Client::new()
            });

        Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    fn build_request(&self, system: &str, user: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

#[async_trait]
impl CompletionService for OpenAiCompletionService {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        debug!("发送翻译请求到: {}，文本长度: {} 字符", self.api_url, user.chars().count());

        let request = self.build_request(system, user);
        let mut builder = self
            .client
            .post(&self.api_url)
            .header("Accept", "application/json")
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TranslationError::Custom(format!("网络请求失败: {}", e)))?;

        let status = response.status();
        debug!("API响应状态: {}", status);

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "无法读取错误信息".to_string());
            error!("API请求失败: {} - {}", status, error_text);
            return Err(status_error(status, error_text));
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| TranslationError::Custom(format!("读取响应文本失败: {}", e)))?;

        parse_completion(&response_text)
    }
}

fn status_error(status: StatusCode, body: String) -> TranslationError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        TranslationError::RateLimitError(body)
    } else {
        TranslationError::ApiError {
            code: status.as_u16() as i32,
            message: body,
        }
    }
}

/// 从响应 JSON 中取出第一条回复的文本
pub(crate) fn parse_completion(body: &str) -> Result<String> {
    let parsed: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| TranslationError::ParseError(format!("无法解析JSON响应: {}", e)))?;

    let content = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| TranslationError::ParseError(format!("响应中没有翻译结果: {}", body)))?;

    if content.trim().is_empty() {
        return Err(TranslationError::ParseError("API返回了空的翻译结果".to_string()));
    }
    Ok(content)
}
