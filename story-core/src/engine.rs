//! The stage controller.
//!
//! [`StoryEngine`] owns all transition logic: given an inbound message it
//! classifies the intent against the identity's session, calls the
//! generation backend where the transition requires it, persists the session
//! and renders the reply. Backend failures are fail-soft: the stage's field
//! is set to the configured failure message, the stage does not advance, and
//! the failure message is surfaced as the reply so the user can retry.

use crate::backend::GenerationBackend;
use crate::config::EngineConfig;
use crate::intent::{classify, Intent};
use crate::reply::{self, Presentation};
use crate::session::{Session, SessionStore, Stage};
use tracing::{debug, info, warn};

/// Result of handling one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The message is not for this engine; the host must not reply.
    Pass,

    /// A normal reply.
    Reply(String),

    /// An error-class reply (empty input, missing theme) the host may want
    /// to flag differently.
    Error(String),
}

impl Outcome {
    /// The reply text, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Outcome::Pass => None,
            Outcome::Reply(text) | Outcome::Error(text) => Some(text),
        }
    }
}

/// Per-identity iterative story-creation engine.
pub struct StoryEngine<B> {
    backend: B,
    store: SessionStore,
    config: EngineConfig,
}

impl StoryEngine<storygen::StoryGen> {
    /// Build an engine backed by the HTTP backend named in the config.
    pub fn from_config(config: EngineConfig) -> Result<Self, storygen::Error> {
        let backend = storygen::StoryGen::new(&config.api_url)?;
        Ok(Self::new(backend, config))
    }
}

impl<B: GenerationBackend> StoryEngine<B> {
    /// Create an engine with the given backend and configuration.
    pub fn new(backend: B, config: EngineConfig) -> Self {
        Self {
            backend,
            store: SessionStore::new(),
            config,
        }
    }

    /// The engine's configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The session store.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// The generation backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Usage blurb for the host's help surface.
    pub fn help_text(&self) -> String {
        reply::help_text()
    }

    /// Handle one inbound text message for an identity.
    ///
    /// Messages for the same identity are serialized in arrival order by a
    /// per-identity lock held across the whole classify/generate/persist
    /// sequence; distinct identities proceed in parallel.
    pub async fn handle_message(&self, identity: &str, text: &str) -> Outcome {
        if text.trim().is_empty() {
            return Outcome::Error(self.config.no_text_message.clone());
        }

        let guard = self.store.lock_identity(identity).await;

        let session = self.store.get(identity).await;
        let outcome = match classify(&self.config, session.is_some(), text) {
            None => Outcome::Pass,
            Some(intent) => {
                debug!(identity, ?intent, "classified inbound message");
                match (session, intent) {
                    (None, Intent::Start(theme)) => self.start(identity, theme).await,
                    (None, Intent::EmptyStart) => {
                        Outcome::Error(self.config.empty_theme_message.clone())
                    }
                    (Some(_), Intent::Exit) => {
                        self.store.remove(identity).await;
                        info!(identity, "workflow abandoned");
                        Outcome::Reply(reply::exit_reply())
                    }
                    (Some(session), Intent::Modify(addition)) => {
                        self.modify(identity, session, &addition).await
                    }
                    (Some(session), Intent::Reject) => self.reject(identity, session).await,
                    (Some(session), Intent::Accept) => self.accept(identity, session).await,
                    (Some(session), Intent::Unrecognized) => {
                        Outcome::Reply(reply::clarify(session.stage))
                    }
                    // Classifier output for the other (session, intent)
                    // pairings is unreachable; treat any drift as the idle
                    // no-intent case.
                    _ => Outcome::Pass,
                }
            }
        };

        // Reclaim the lock entry for identities that no longer hold a
        // session, so the lock map does not grow with every identity seen.
        drop(guard);
        self.store.prune_lock(identity).await;

        outcome
    }

    /// Idle + Start: create the session and generate the first outline.
    async fn start(&self, identity: &str, theme: String) -> Outcome {
        let mut session = Session::new(&theme);

        let outcome = match self.backend.outline(&theme).await {
            Ok(outline) => {
                session.outline = outline.clone();
                Outcome::Reply(reply::stage_reply(
                    Stage::Outline,
                    Presentation::Fresh,
                    &outline,
                ))
            }
            Err(error) => {
                warn!(identity, %error, "outline generation failed");
                session.outline = self.config.generation_failed_message.clone();
                Outcome::Reply(self.config.generation_failed_message.clone())
            }
        };

        info!(identity, theme = %theme, "workflow started");
        self.store.insert(identity, session).await;
        outcome
    }

    /// Append the user's addition to the current stage's text and regenerate
    /// from the appended text. The appended text becomes the generation
    /// input; the stored field is overwritten with the backend's output.
    async fn modify(&self, identity: &str, mut session: Session, addition: &str) -> Outcome {
        let stage = session.stage;
        let appended = format!("{} {}", session.content(stage), addition);

        let result = match stage {
            Stage::Outline => self.backend.outline(&appended).await,
            Stage::Storyline => self.backend.storyline(&appended).await,
            Stage::Story => self.backend.story(&session.outline, &appended).await,
        };

        let outcome = match result {
            Ok(text) => {
                *session.content_mut(stage) = text.clone();
                Outcome::Reply(reply::stage_reply(stage, Presentation::Modified, &text))
            }
            Err(error) => {
                warn!(identity, ?stage, %error, "regeneration after modify failed");
                *session.content_mut(stage) = self.config.generation_failed_message.clone();
                Outcome::Reply(self.config.generation_failed_message.clone())
            }
        };

        self.store.insert(identity, session).await;
        outcome
    }

    /// Discard accumulated edits and regenerate the current stage from the
    /// previous stage's stable output, never from the mutated current text.
    async fn reject(&self, identity: &str, mut session: Session) -> Outcome {
        let stage = session.stage;

        let result = match stage {
            Stage::Outline => self.backend.outline(&session.theme).await,
            Stage::Storyline => self.backend.storyline(&session.outline).await,
            Stage::Story => {
                self.backend
                    .story(&session.outline, &session.storyline)
                    .await
            }
        };

        let outcome = match result {
            Ok(text) => {
                *session.content_mut(stage) = text.clone();
                Outcome::Reply(reply::stage_reply(stage, Presentation::Regenerated, &text))
            }
            Err(error) => {
                warn!(identity, ?stage, %error, "regeneration after reject failed");
                *session.content_mut(stage) = self.config.generation_failed_message.clone();
                Outcome::Reply(self.config.generation_failed_message.clone())
            }
        };

        self.store.insert(identity, session).await;
        outcome
    }

    /// Accept the current stage: generate the next stage's content and
    /// advance, or compose the final artifact and end the workflow.
    async fn accept(&self, identity: &str, mut session: Session) -> Outcome {
        let Some(next) = session.stage.next() else {
            // Story accepted: the workflow is complete.
            let compiled =
                reply::completion_reply(&session.outline, &session.storyline, &session.story);
            self.store.remove(identity).await;
            info!(identity, "workflow completed");
            return Outcome::Reply(compiled);
        };

        let result = match next {
            Stage::Storyline => self.backend.storyline(&session.outline).await,
            Stage::Story => {
                self.backend
                    .story(&session.outline, &session.storyline)
                    .await
            }
            Stage::Outline => unreachable!("outline is never the next stage"),
        };

        let outcome = match result {
            Ok(text) => {
                session.stage = next;
                *session.content_mut(next) = text.clone();
                info!(identity, stage = ?next, "stage advanced");
                Outcome::Reply(reply::stage_reply(next, Presentation::Fresh, &text))
            }
            Err(error) => {
                warn!(identity, stage = ?next, %error, "stage generation failed");
                *session.content_mut(next) = self.config.generation_failed_message.clone();
                Outcome::Reply(self.config.generation_failed_message.clone())
            }
        };

        self.store.insert(identity, session).await;
        outcome
    }
}
