//! Iterative story-creation workflow engine.
//!
//! This crate turns a free-text topic into a finished story through three
//! dependent generation stages (outline → storyline → story), each revisable
//! through user feedback before the next stage is produced. It provides:
//! - Per-identity sessions with serialized, arrival-order processing
//! - Command classification over configurable literals
//! - A fail-soft boundary to the generation backend
//! - Pure reply composition with fixed per-stage templates
//!
//! # Quick Start
//!
//! ```ignore
//! use story_core::{EngineConfig, Outcome, StoryEngine};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EngineConfig::load("config.json").await?;
//!     let engine = StoryEngine::from_config(config)?;
//!
//!     match engine.handle_message("user-42", "生成故事 雨中的城市").await {
//!         Outcome::Pass => {}                      // not ours, stay silent
//!         Outcome::Reply(text) => println!("{text}"),
//!         Outcome::Error(text) => eprintln!("{text}"),
//!     }
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod config;
pub mod engine;
pub mod intent;
pub mod reply;
pub mod session;
pub mod testing;

// Primary public API
pub use backend::GenerationBackend;
pub use config::{ConfigError, EngineConfig};
pub use engine::{Outcome, StoryEngine};
pub use intent::{classify, Intent};
pub use session::{Session, SessionStore, Stage};
pub use testing::{MockBackend, TestHarness};
