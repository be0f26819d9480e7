//! Caller-facing entry point for turning story state into a comic page.

use crate::diffusion::{GenerationRequest, StoryDiffusionClient, StoryImageService};
use crate::image::GeneratedImage;
use crate::models::{Character, Config, SceneInput, StorySetup};
use crate::{prompts, Result};
use tracing::{error, info, warn};

/// Validates the user's scenes, assembles the request and renders it.
pub struct StoryGenerator {
    image_service: Box<dyn StoryImageService>,
}

impl StoryGenerator {
    /// Build a generator around any image service.
    ///
    /// Tests and local harnesses use this to inject
    /// [`MockStoryImageClient`](crate::diffusion::MockStoryImageClient).
    pub fn with_service(image_service: Box<dyn StoryImageService>) -> Self {
        Self { image_service }
    }

    /// Construct a generator backed by the hosted StoryDiffusion endpoint.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = StoryDiffusionClient::new(config)?;
        Ok(Self::with_service(Box::new(client)))
    }

    /// Render all valid scenes into one image.
    ///
    /// Fails with `EmptyInput` before any network call when every scene is
    /// blank. Failures from the image service are returned after its own
    /// retries are used up.
    pub async fn generate_story_image(
        &self,
        scenes: &[SceneInput],
        character: &Character,
        setup: &StorySetup,
    ) -> Result<GeneratedImage> {
        let prompt = prompts::assemble(scenes, character, setup).map_err(|e| {
            warn!("Rejected story input: {}", e);
            e
        })?;

        if character.description.trim().is_empty() {
            warn!("Character description is empty; panels may not share a consistent character");
        }

        info!(
            "Generating story image: {} scene(s), style '{}'",
            prompt.scene_count(),
            character.style
        );

        let request = GenerationRequest::new(
            character.description.as_str(),
            character.style.as_str(),
            prompt,
        );

        self.image_service
            .generate(&request)
            .await
            .map_err(|e| {
                error!("Story image generation failed: {}", e);
                e
            })
    }

    /// Convenience wrapper for form state held as parallel arrays.
    pub async fn generate_from_form(
        &self,
        scene_texts: &[String],
        hide_character_flags: &[bool],
        character: &Character,
        setup: &StorySetup,
    ) -> Result<GeneratedImage> {
        let scenes = SceneInput::pair_up(scene_texts, hide_character_flags);
        self.generate_story_image(&scenes, character, setup).await
    }
}
