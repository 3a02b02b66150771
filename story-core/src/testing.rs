//! Testing utilities for the workflow engine.
//!
//! This module provides tools for integration testing:
//! - `MockBackend` for deterministic testing without a live backend
//! - `TestHarness` for scripted workflow scenarios
//! - Assertion helpers for verifying session state

use crate::backend::GenerationBackend;
use crate::config::EngineConfig;
use crate::engine::{Outcome, StoryEngine};
use crate::session::{Session, Stage};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// A deterministic generation backend.
///
/// Outputs are a pure function of the input, so regenerating from the same
/// input always yields the same string. Every request is recorded for
/// inspection, and the next N calls can be forced to fail.
#[derive(Debug, Default)]
pub struct MockBackend {
    requests: Mutex<Vec<String>>,
    failures_remaining: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// The outline the mock produces for a theme.
    pub fn mock_outline(theme: &str) -> String {
        format!("outline<{theme}>")
    }

    /// The storyline the mock produces for an outline.
    pub fn mock_storyline(outline: &str) -> String {
        format!("storyline<{outline}>")
    }

    /// The story the mock produces for an outline and storyline.
    pub fn mock_story(outline: &str, storyline: &str) -> String {
        format!("story<{outline}|{storyline}>")
    }

    /// Force the next `n` generation calls to fail.
    pub fn fail_next(&self, n: usize) {
        self.failures_remaining.store(n, Ordering::SeqCst);
    }

    /// All generation inputs received so far, in call order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// The most recent generation input.
    pub fn last_request(&self) -> Option<String> {
        self.requests.lock().unwrap().last().cloned()
    }

    fn record(&self, request: String) -> Result<(), storygen::Error> {
        self.requests.lock().unwrap().push(request);

        let remaining = self.failures_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_remaining.store(remaining - 1, Ordering::SeqCst);
            return Err(storygen::Error::Api {
                status: 500,
                message: "scripted failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl GenerationBackend for MockBackend {
    async fn outline(&self, theme: &str) -> Result<String, storygen::Error> {
        self.record(format!("outline:{theme}"))?;
        Ok(Self::mock_outline(theme))
    }

    async fn storyline(&self, outline: &str) -> Result<String, storygen::Error> {
        self.record(format!("storyline:{outline}"))?;
        Ok(Self::mock_storyline(outline))
    }

    async fn story(&self, outline: &str, storyline: &str) -> Result<String, storygen::Error> {
        self.record(format!("story:{outline}|{storyline}"))?;
        Ok(Self::mock_story(outline, storyline))
    }
}

/// Test harness wiring a [`StoryEngine`] to a [`MockBackend`].
pub struct TestHarness {
    pub engine: StoryEngine<MockBackend>,
}

impl TestHarness {
    /// Create a harness with the default config.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create a harness with a custom config.
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            engine: StoryEngine::new(MockBackend::new(), config),
        }
    }

    /// Send a message and get the outcome.
    pub async fn send(&self, identity: &str, text: &str) -> Outcome {
        self.engine.handle_message(identity, text).await
    }

    /// Send a message and get the reply text, panicking on a silent pass.
    pub async fn reply(&self, identity: &str, text: &str) -> String {
        match self.send(identity, text).await {
            Outcome::Reply(text) | Outcome::Error(text) => text,
            Outcome::Pass => panic!("expected a reply for {text:?}, engine stayed silent"),
        }
    }

    /// Snapshot of the identity's session.
    pub async fn session(&self, identity: &str) -> Option<Session> {
        self.engine.store().get(identity).await
    }

    /// Current stage for the identity, if a session exists.
    pub async fn stage(&self, identity: &str) -> Option<Stage> {
        self.session(identity).await.map(|s| s.stage)
    }

    /// Whether the identity has a session.
    pub async fn has_session(&self, identity: &str) -> bool {
        self.engine.store().exists(identity).await
    }

    /// The mock backend, for request inspection and failure scripting.
    pub fn backend(&self) -> &MockBackend {
        self.engine.backend()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Assert the identity is at the expected stage.
#[track_caller]
pub fn assert_stage(session: &Option<Session>, expected: Stage) {
    match session {
        Some(s) => assert_eq!(
            s.stage, expected,
            "expected stage {expected:?}, got {:?}",
            s.stage
        ),
        None => panic!("expected stage {expected:?}, but no session exists"),
    }
}

/// Assert the identity has no session.
#[track_caller]
pub fn assert_no_session(session: &Option<Session>) {
    assert!(
        session.is_none(),
        "expected no session, found one at stage {:?}",
        session.as_ref().map(|s| s.stage)
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_is_deterministic() {
        let backend = MockBackend::new();
        let a = backend.outline("t").await.unwrap();
        let b = backend.outline("t").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a, MockBackend::mock_outline("t"));
    }

    #[tokio::test]
    async fn test_mock_records_requests() {
        let backend = MockBackend::new();
        backend.outline("t").await.unwrap();
        backend.story("o", "s").await.unwrap();
        assert_eq!(
            backend.requests(),
            vec!["outline:t".to_string(), "story:o|s".to_string()]
        );
        assert_eq!(backend.last_request().unwrap(), "story:o|s");
    }

    #[tokio::test]
    async fn test_mock_scripted_failures() {
        let backend = MockBackend::new();
        backend.fail_next(2);
        assert!(backend.outline("t").await.is_err());
        assert!(backend.storyline("o").await.is_err());
        assert!(backend.outline("t").await.is_ok());
    }

    #[tokio::test]
    async fn test_harness_basic_flow() {
        let harness = TestHarness::new();
        harness.send("u", "生成故事 龙").await;
        assert_stage(&harness.session("u").await, Stage::Outline);

        harness.send("u", "退出").await;
        assert_no_session(&harness.session("u").await);
    }
}
