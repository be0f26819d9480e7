//! StoryDiffusion image-generation service integration
//!
//! Sends an assembled comic prompt to the hosted StoryDiffusion endpoint and
//! returns the rendered page.

pub mod client;
pub mod mock;
pub mod types;

pub use client::{backoff_schedule, StoryDiffusionClient, MAX_ATTEMPTS};
pub use mock::MockStoryImageClient;
pub use types::GenerationRequest;

use crate::image::GeneratedImage;
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait StoryImageService: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedImage>;
}
