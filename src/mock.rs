//! Mock completion service for testing
//!
//! A deterministic, network-free stand-in for the completion API. Useful for
//! tests and for dry runs of the pipeline without an API key.

use crate::completion::CompletionService;
use crate::error::{Result, TranslationError};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

static ANY_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[PROTECTED_ELEMENT_\d+\]").expect("placeholder pattern must compile"));

/// Mock behaviors
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Return the user content unchanged
    Identity,
    /// Append a suffix to every paragraph: "Hello" → "Hello [zh]"
    Suffix(String),
    /// Always fail with an API error
    Failing,
    /// Fail on the given zero-based call numbers, echo otherwise
    FailOnCalls(HashSet<usize>),
    /// Echo the content with every placeholder removed
    DropPlaceholders,
}

/// One recorded call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub system: String,
    pub user: String,
}

#[derive(Debug, Clone)]
pub struct MockCompletionService {
    mode: MockMode,
    calls: Arc<Mutex<Vec<MockCall>>>,
}

impl MockCompletionService {
    pub fn new(mode: MockMode) -> Self {
        Self {
            mode,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn identity() -> Self {
        Self::new(MockMode::Identity)
    }

    pub fn failing() -> Self {
        Self::new(MockMode::Failing)
    }

    pub fn fail_on(calls: impl IntoIterator<Item = usize>) -> Self {
        Self::new(MockMode::FailOnCalls(calls.into_iter().collect()))
    }

    /// All calls received so far, in arrival order
    pub async fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

#[async_trait]
impl CompletionService for MockCompletionService {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let call_number = {
            let mut calls = self.calls.lock().await;
            calls.push(MockCall {
                system: system.to_string(),
                user: user.to_string(),
            });
            calls.len() - 1
        };

        match &self.mode {
            MockMode::Identity => Ok(user.to_string()),
            MockMode::Suffix(suffix) => Ok(user
                .split("\n\n")
                .map(|p| format!("{} {}", p, suffix))
                .collect::<Vec<_>>()
                .join("\n\n")),
            MockMode::Failing => Err(TranslationError::ApiError {
                code: 503,
                message: "mock service unavailable".to_string(),
            }),
            MockMode::FailOnCalls(failing) => {
                if failing.contains(&call_number) {
                    Err(TranslationError::RateLimitError(format!(
                        "mock quota exceeded on call {}",
                        call_number
                    )))
                } else {
                    Ok(user.to_string())
                }
            }
            MockMode::DropPlaceholders => Ok(ANY_PLACEHOLDER.replace_all(user, "").into_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_identity_echoes_and_records() {
        let mock = MockCompletionService::identity();
        assert_eq!(mock.complete("sys", "hello").await.unwrap(), "hello");
        assert_eq!(
            mock.calls().await,
            vec![MockCall {
                system: "sys".to_string(),
                user: "hello".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_suffix_per_paragraph() {
        let mock = MockCompletionService::new(MockMode::Suffix("[fr]".to_string()));
        let out = mock.complete("", "a\n\nb [PROTECTED_ELEMENT_0]").await.unwrap();
        assert_eq!(out, "a [fr]\n\nb [PROTECTED_ELEMENT_0] [fr]");
    }

    #[tokio::test]
    async fn test_fail_on_selected_calls() {
        let mock = MockCompletionService::fail_on([1]);
        assert!(mock.complete("", "first").await.is_ok());
        assert!(mock.complete("", "second").await.is_err());
        assert!(mock.complete("", "third").await.is_ok());
        assert_eq!(mock.call_count().await, 3);
    }

    #[tokio::test]
    async fn test_drop_placeholders() {
        let mock = MockCompletionService::new(MockMode::DropPlaceholders);
        let out = mock.complete("", "x [PROTECTED_ELEMENT_12] y").await.unwrap();
        assert_eq!(out, "x  y");
    }

    #[test]
    fn test_failing_blocking() {
        let mock = MockCompletionService::failing();
        let result = tokio_test::block_on(mock.complete("", "text"));
        assert!(matches!(result, Err(TranslationError::ApiError { code: 503, .. })));
    }
}
