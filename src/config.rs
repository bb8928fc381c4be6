//! 配置管理模块
//!
//! 提供TOML配置文件的读取、写入和自动发现功能，以及环境变量覆盖。

use crate::error::{Result, TranslationError};
use crate::types::TranslationConfig;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// API 密钥的环境变量
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
/// API 地址的环境变量
pub const API_URL_ENV: &str = "OPENAI_API_URL";

/// 翻译库配置结构
///
/// 包含所有翻译相关的配置选项，支持从TOML文件加载和保存。
///
/// # 示例
///
/// ```rust,no_run
/// use md_paper_translator::TranslationLibConfig;
///
/// // 从默认位置加载配置
/// let config = TranslationLibConfig::load_from_default_locations();
///
/// // 从指定文件加载配置
/// let config = TranslationLibConfig::from_file("config.toml").unwrap();
///
/// // 保存配置到文件
/// config.save_to_file("output.toml").unwrap();
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslationLibConfig {
    /// 翻译配置
    #[serde(default)]
    pub translation: TranslationConfig,
}

impl TranslationLibConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| TranslationError::io(path, e))?;
        let config: TranslationLibConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| TranslationError::io(path, e))?;
        Ok(())
    }

    /// Load configuration from multiple possible locations
    pub fn load_from_default_locations() -> Self {
        let possible_paths = [
            "translation-config.toml",
            "config.toml",
            ".translation-config.toml",
        ];

        for path in &possible_paths {
            if Path::new(path).exists() {
                match Self::from_file(path) {
                    Ok(config) => {
                        info!("Loaded configuration from: {}", path);
                        return config;
                    }
                    Err(e) => {
                        warn!("Failed to load config from {}: {}", path, e);
                    }
                }
            }
        }

        info!("No configuration file found, using defaults");
        Self::default()
    }

    /// Generate example configuration file
    pub fn generate_example_config<P: AsRef<Path>>(path: P) -> Result<()> {
        Self::default().save_to_file(path)
    }

    /// 用环境变量覆盖 API 密钥和地址
    pub fn apply_env(mut self) -> Self {
        self.translation.apply_overrides(
            std::env::var(API_KEY_ENV).ok(),
            std::env::var(API_URL_ENV).ok(),
        );
        self
    }
}

impl TranslationConfig {
    /// 非空的值覆盖现有配置
    pub fn apply_overrides(&mut self, api_key: Option<String>, api_url: Option<String>) {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.api_url = url;
        }
    }

    /// 校验配置
    pub fn validate(&self) -> Result<()> {
        if self.max_text_length == 0 {
            return Err(TranslationError::Config("max_text_length must be greater than 0".into()));
        }
        if self.max_concurrent_requests == 0 {
            return Err(TranslationError::Config(
                "max_concurrent_requests must be greater than 0".into(),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(TranslationError::Config("model must not be empty".into()));
        }
        if self.api_url.trim().is_empty() {
            return Err(TranslationError::Config("api_url must not be empty".into()));
        }
        if self.target_lang.trim().is_empty() {
            return Err(TranslationError::Config("target_lang must not be empty".into()));
        }
        Ok(())
    }
}
