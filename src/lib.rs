//! Illustrated story generation for StoryVerse
//!
//! Assembles a user's character, story setup and scene descriptions into a
//! multi-panel comic prompt, then renders it through the hosted StoryDiffusion
//! image service with timeouts and linear-backoff retries.

pub mod diffusion;
pub mod error;
pub mod image;
pub mod models;
pub mod prompts;
pub mod story;

pub use error::{Error, Result};
