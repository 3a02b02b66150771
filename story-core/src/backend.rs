//! Generation backend seam.
//!
//! The engine talks to the backend through this trait so tests can plug in
//! a deterministic mock. The real implementation is [`storygen::StoryGen`].

use async_trait::async_trait;

/// A backend that produces stage content.
///
/// No retries are expected from implementations; a single failure is
/// reported as-is and the engine converts it to the configured failure
/// message without advancing the stage.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Produce an outline from a theme.
    async fn outline(&self, theme: &str) -> Result<String, storygen::Error>;

    /// Produce a storyline from an outline.
    async fn storyline(&self, outline: &str) -> Result<String, storygen::Error>;

    /// Produce the full story text from an outline and storyline.
    async fn story(&self, outline: &str, storyline: &str) -> Result<String, storygen::Error>;
}

#[async_trait]
impl GenerationBackend for storygen::StoryGen {
    async fn outline(&self, theme: &str) -> Result<String, storygen::Error> {
        self.generate_outline(theme).await
    }

    async fn storyline(&self, outline: &str) -> Result<String, storygen::Error> {
        self.generate_storyline(outline).await
    }

    async fn story(&self, outline: &str, storyline: &str) -> Result<String, storygen::Error> {
        self.generate_story(outline, storyline).await
    }
}
