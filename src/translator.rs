//! 翻译服务核心模块
//!
//! 提供主要的翻译流程：保护特殊元素、分块、逐块请求补全服务、
//! 拼接结果并恢复特殊元素。

use crate::chunker::{chunk_text, join_chunks};
use crate::completion::{CompletionService, OpenAiCompletionService};
use crate::error::{Result, TranslationError};
use crate::protector::{missing_placeholders, protect_with_mode, restore};
use crate::types::{Chunk, DocumentTranslation, TranslatedChunk, TranslationConfig};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tokio::time::{sleep_until, Instant};

/// 速率限制器
///
/// 单槽位的间隔闸门：一次请求结束后，至少间隔 `interval` 才能开始下一次请求，
/// 第一次请求不等待。信号量限制同时在途的请求数。
#[derive(Clone)]
pub struct RateLimiter {
    /// 信号量，用于控制并发请求数量
    semaphore: Arc<Semaphore>,
    /// 上一次请求开始或结束的时间
    last_request: Arc<Mutex<Option<Instant>>>,
    /// 请求间隔延迟
    interval: Duration,
}

/// 请求许可，释放时记录请求结束的时间
pub struct RatePermit {
    _permit: OwnedSemaphorePermit,
    last_request: Arc<Mutex<Option<Instant>>>,
}

impl Drop for RatePermit {
    fn drop(&mut self) {
        if let Ok(mut last) = self.last_request.try_lock() {
            *last = Some(Instant::now());
        }
    }
}

impl RateLimiter {
    /// 创建新的速率限制器
    ///
    /// # 参数
    ///
    /// * `interval` - 相邻请求之间的固定间隔
    /// * `max_concurrent` - 最大并发请求数，至少为 1
    ///
    /// # 示例
    ///
    /// ```rust
    /// use md_paper_translator::RateLimiter;
    /// use std::time::Duration;
    ///
    /// let limiter = RateLimiter::new(Duration::from_secs(1), 1);
    /// ```
    pub fn new(interval: Duration, max_concurrent: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
            last_request: Arc::new(Mutex::new(None)),
            interval,
        }
    }

    /// 获取请求许可
    ///
    /// 在发起API请求前调用此方法，许可在请求完成后丢弃。
    ///
    /// # 返回
    ///
    /// * `Ok(RatePermit)` - 成功获取许可
    /// * `Err(TranslationError)` - 信号量已关闭
    pub async fn acquire(&self) -> Result<RatePermit> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| TranslationError::RateLimitError(format!("Rate limiter error: {}", e)))?;

        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            if !self.interval.is_zero() {
                sleep_until(previous + self.interval).await;
            }
        }
        *last = Some(Instant::now());
        drop(last);

        Ok(RatePermit {
            _permit: permit,
            last_request: Arc::clone(&self.last_request),
        })
    }
}

/// 生成翻译用的系统指令
pub fn build_system_prompt(target_language: &str) -> String {
    format!(
        "You are a professional academic translator. Translate the following text into {}, \
         keeping the academic register and the precision of technical terms. \
         Preserve all original formatting, including heading levels, lists and paragraph structure. \
         Do not translate or modify placeholder tokens such as [PROTECTED_ELEMENT_0]; \
         copy every placeholder exactly as it appears.",
        target_language
    )
}

/// 按 `sequence_position` 顺序用空行拼接翻译结果
pub fn reassemble(translated: &[TranslatedChunk]) -> String {
    let mut ordered: Vec<&TranslatedChunk> = translated.iter().collect();
    ordered.sort_by_key(|c| c.sequence_position);
    join_chunks(ordered.into_iter().map(|c| c.text.as_str()))
}

/// 默认输出路径：`<输入文件名>_translated.md`
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{}_translated.md", stem))
}

/// 翻译服务主类
///
/// 串联元素保护、分块、逐块翻译和恢复。单个文本块翻译失败时不重试，
/// 直接保留该块原文，整个流程总能产出完整的文档。
///
/// # 示例
///
/// ```rust
/// use md_paper_translator::{MockCompletionService, TranslationConfig, TranslationService};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() {
///     let config = TranslationConfig {
///         request_interval_ms: 0,
///         ..TranslationConfig::default()
///     };
///     let service = TranslationService::with_service(config, Arc::new(MockCompletionService::identity()));
///
///     let markdown = "# Title\n\nMass-energy: $E=mc^2$.";
///     let result = service.translate_document(markdown).await;
///     assert_eq!(result.text, markdown);
/// }
/// ```
#[derive(Clone)]
pub struct TranslationService {
    /// 补全服务
    service: Arc<dyn CompletionService>,
    /// 速率限制器
    rate_limiter: RateLimiter,
    /// 翻译配置
    config: TranslationConfig,
}

impl TranslationService {
    /// 使用 OpenAI 兼容接口创建翻译服务
    pub fn new(config: TranslationConfig) -> Self {
        let service = Arc::new(OpenAiCompletionService::new(&config));
        Self::with_service(config, service)
    }

    /// 使用指定的补全服务创建翻译服务
    pub fn with_service(config: TranslationConfig, service: Arc<dyn CompletionService>) -> Self {
        let rate_limiter = RateLimiter::new(
            Duration::from_millis(config.request_interval_ms),
            config.max_concurrent_requests,
        );
        Self {
            service,
            rate_limiter,
            config,
        }
    }

    pub fn config(&self) -> &TranslationConfig {
        &self.config
    }

    /// Translate every chunk, one request per chunk, results ordered by
    /// `sequence_position`.
    ///
    /// Failures are never retried; the chunk's own text is kept instead and
    /// the result is marked `translated: false`.
    pub async fn run(&self, chunks: &[Chunk], target_language: &str) -> Vec<TranslatedChunk> {
        if self.config.max_concurrent_requests > 1 && chunks.len() > 1 {
            return self.run_concurrent(chunks, target_language).await;
        }

        let total = chunks.len();
        let mut translated = Vec::with_capacity(total);
        for chunk in chunks {
            translated.push(self.translate_chunk(chunk, target_language, total).await);
        }
        translated
    }

    async fn run_concurrent(&self, chunks: &[Chunk], target_language: &str) -> Vec<TranslatedChunk> {
        let total = chunks.len();
        let mut handles = Vec::with_capacity(total);

        for chunk in chunks {
            let translator = self.clone();
            let chunk = chunk.clone();
            let target_language = target_language.to_string();
            handles.push(tokio::spawn(async move {
                translator.translate_chunk(&chunk, &target_language, total).await
            }));
        }

        let mut translated = Vec::with_capacity(total);
        for (handle, chunk) in handles.into_iter().zip(chunks) {
            match handle.await {
                Ok(result) => translated.push(result),
                Err(e) => {
                    error!("第 {} 块翻译任务异常退出，保留原文: {}", chunk.sequence_position + 1, e);
                    translated.push(untranslated(chunk));
                }
            }
        }
        translated
    }

    async fn translate_chunk(&self, chunk: &Chunk, target_language: &str, total: usize) -> TranslatedChunk {
        let _permit = match self.rate_limiter.acquire().await {
            Ok(permit) => permit,
            Err(e) => {
                warn!("第 {} 块无法获取请求许可，保留原文: {}", chunk.sequence_position + 1, e);
                return untranslated(chunk);
            }
        };

        info!("正在翻译第 {}/{} 块...", chunk.sequence_position + 1, total);
        let system = build_system_prompt(target_language);

        match self.service.complete(&system, &chunk.text).await {
            Ok(text) => TranslatedChunk {
                sequence_position: chunk.sequence_position,
                text,
                translated: true,
            },
            Err(e) => {
                error!("第 {} 块翻译失败，保留原文: {}", chunk.sequence_position + 1, e);
                untranslated(chunk)
            }
        }
    }

    /// 翻译整篇文档，目标语言取自配置
    pub async fn translate_document(&self, text: &str) -> DocumentTranslation {
        let target_language = self.config.target_lang.clone();
        self.translate_document_to(text, &target_language).await
    }

    /// 翻译整篇文档到指定语言
    pub async fn translate_document_to(&self, text: &str, target_language: &str) -> DocumentTranslation {
        let protected = protect_with_mode(text, self.config.substitution_mode);
        info!("识别到 {} 个受保护元素", protected.spans.len());

        let chunks = chunk_text(&protected.sanitized, self.config.max_text_length);
        info!("文本已分割为 {} 个块", chunks.len());

        let translated = self.run(&chunks, target_language).await;
        let failed_chunks: Vec<usize> = translated
            .iter()
            .filter(|c| !c.translated)
            .map(|c| c.sequence_position)
            .collect();
        if !failed_chunks.is_empty() {
            warn!("{} 个文本块未能翻译，已保留原文", failed_chunks.len());
        }

        let joined = reassemble(&translated);
        let missing = missing_placeholders(&joined, &protected.spans);
        if !missing.is_empty() {
            warn!("翻译结果缺少 {} 个占位符，对应元素无法恢复: {:?}", missing.len(), missing);
        }

        DocumentTranslation {
            text: restore(&joined, &protected.spans),
            chunk_count: chunks.len(),
            failed_chunks,
            missing_placeholders: missing,
        }
    }

    /// 翻译文本，只返回最终结果
    pub async fn translate(&self, text: &str) -> Result<String> {
        Ok(self.translate_document(text).await.text)
    }

    /// 翻译 Markdown 文件
    ///
    /// 读取或写入失败时返回错误，读取失败时不会生成输出文件。
    pub async fn translate_file(&self, input: &Path, output: &Path) -> Result<DocumentTranslation> {
        let content = std::fs::read_to_string(input).map_err(|e| TranslationError::io(input, e))?;
        info!("读取 {}，共 {} 字符", input.display(), content.chars().count());

        let result = self.translate_document(&content).await;

        std::fs::write(output, &result.text).map_err(|e| TranslationError::io(output, e))?;
        info!("翻译完成！结果已保存到 {}", output.display());
        Ok(result)
    }
}

fn untranslated(chunk: &Chunk) -> TranslatedChunk {
    TranslatedChunk {
        sequence_position: chunk.sequence_position,
        text: chunk.text.clone(),
        translated: false,
    }
}
