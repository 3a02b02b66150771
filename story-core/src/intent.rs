//! Command classification.
//!
//! Maps raw inbound text to an [`Intent`] given whether the identity already
//! has a session. Returning `None` means the message is not for this engine
//! at all and the host must stay silent.

use crate::config::EngineConfig;

/// Classified meaning of an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Start a new workflow with the given theme.
    Start(String),

    /// Trigger phrase present but no theme supplied.
    EmptyStart,

    /// Append the given text to the current stage and regenerate.
    Modify(String),

    /// Discard edits and regenerate from the previous stage's output.
    Reject,

    /// Accept the current stage and advance.
    Accept,

    /// Abandon the workflow.
    Exit,

    /// A session exists but the message matched nothing.
    Unrecognized,
}

/// Classify inbound text against the configured command literals.
///
/// With a session, the predicates are an ordered list and the order is
/// load-bearing: the dissatisfied marker contains the satisfied marker as a
/// substring, so Reject must be checked before Accept.
pub fn classify(cfg: &EngineConfig, session_exists: bool, text: &str) -> Option<Intent> {
    let text = text.trim();

    if session_exists {
        if text == cfg.exit_keyword {
            return Some(Intent::Exit);
        }
        if let Some(addition) = text.strip_prefix(&cfg.modify_prefix) {
            return Some(Intent::Modify(addition.trim().to_string()));
        }
        if text.contains(&cfg.dissatisfied_marker) {
            return Some(Intent::Reject);
        }
        if text.contains(&cfg.satisfied_marker) {
            return Some(Intent::Accept);
        }
        return Some(Intent::Unrecognized);
    }

    // No session: only the trigger phrase means anything; everything else
    // (the exit keyword included) passes through silently.
    if text.contains(&cfg.trigger_word) {
        let theme = text.replacen(&cfg.trigger_word, "", 1).trim().to_string();
        if theme.is_empty() {
            return Some(Intent::EmptyStart);
        }
        return Some(Intent::Start(theme));
    }

    None
}
