//! Engine configuration.
//!
//! All user-facing command literals and messages are supplied at startup,
//! either programmatically through the builder methods or from a JSON
//! config file. Defaults match the original deployment's Chinese wording.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tokio::fs;

/// Errors from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration for the story-creation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Base URL of the generation backend.
    pub api_url: String,

    /// Phrase that starts a new workflow when no session exists.
    pub trigger_word: String,

    /// Prefix (including its trailing separator) for modify commands.
    pub modify_prefix: String,

    /// Keyword that abandons the workflow at any stage.
    pub exit_keyword: String,

    /// Substring signalling acceptance of the current stage.
    pub satisfied_marker: String,

    /// Substring signalling rejection of the current stage.
    ///
    /// Contains `satisfied_marker` as a substring, so the classifier must
    /// check it first.
    pub dissatisfied_marker: String,

    /// Reply for an empty inbound message.
    pub no_text_message: String,

    /// Reply when the trigger phrase carries no topic.
    pub empty_theme_message: String,

    /// Stored and surfaced in place of content when the backend fails.
    pub generation_failed_message: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".to_string(),
            trigger_word: "生成故事".to_string(),
            modify_prefix: "修改 ".to_string(),
            exit_keyword: "退出".to_string(),
            satisfied_marker: "满意".to_string(),
            dissatisfied_marker: "不满意".to_string(),
            no_text_message: "请提供一个故事主题。".to_string(),
            empty_theme_message: "请输入(生成故事 故事的主题)。中途想退出，输入:退出".to_string(),
            generation_failed_message: "故事生成失败。".to_string(),
        }
    }
}

impl EngineConfig {
    /// Create a config with default literals and the given backend URL.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Self::default()
        }
    }

    /// Load configuration from a JSON file.
    ///
    /// Fields absent from the file keep their defaults.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Set the trigger phrase.
    pub fn with_trigger_word(mut self, word: impl Into<String>) -> Self {
        self.trigger_word = word.into();
        self
    }

    /// Set the modify prefix.
    pub fn with_modify_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.modify_prefix = prefix.into();
        self
    }

    /// Set the exit keyword.
    pub fn with_exit_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.exit_keyword = keyword.into();
        self
    }

    /// Set the satisfied/dissatisfied markers.
    pub fn with_markers(
        mut self,
        satisfied: impl Into<String>,
        dissatisfied: impl Into<String>,
    ) -> Self {
        self.satisfied_marker = satisfied.into();
        self.dissatisfied_marker = dissatisfied.into();
        self
    }

    /// Set the message stored and shown when generation fails.
    pub fn with_failure_message(mut self, message: impl Into<String>) -> Self {
        self.generation_failed_message = message.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.trigger_word, "生成故事");
        assert_eq!(config.exit_keyword, "退出");
        assert!(config.dissatisfied_marker.contains(&config.satisfied_marker));
    }

    #[test]
    fn test_builder() {
        let config = EngineConfig::new("http://backend:9000")
            .with_trigger_word("tell a story")
            .with_modify_prefix("edit ")
            .with_markers("good", "not good");

        assert_eq!(config.api_url, "http://backend:9000");
        assert_eq!(config.trigger_word, "tell a story");
        assert_eq!(config.modify_prefix, "edit ");
        assert_eq!(config.satisfied_marker, "good");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"api_url": "http://backend:9000"}"#).unwrap();
        assert_eq!(config.api_url, "http://backend:9000");
        assert_eq!(config.trigger_word, "生成故事");
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"api_url": "http://backend:9000", "trigger_word": "tell a story"}"#,
        )
        .await
        .unwrap();

        let config = EngineConfig::load(&path).await.unwrap();
        assert_eq!(config.api_url, "http://backend:9000");
        assert_eq!(config.trigger_word, "tell a story");
        // Fields absent from the file keep their defaults.
        assert_eq!(config.exit_keyword, "退出");
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = EngineConfig::load(dir.path().join("absent.json")).await;
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[tokio::test]
    async fn test_load_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").await.unwrap();

        let result = EngineConfig::load(&path).await.unwrap_err();
        assert!(matches!(result, ConfigError::Json(_)));
    }
}
