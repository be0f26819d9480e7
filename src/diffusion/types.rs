//! StoryDiffusion request payload and its multipart wire form.

use crate::prompts::StoryPrompt;
use reqwest::multipart::Form;

pub const SEED: u32 = 42;
pub const SD_MODEL: &str = "Unstable";
pub const NUM_STEPS: u32 = 25;
pub const IMAGE_WIDTH: u32 = 768;
pub const IMAGE_HEIGHT: u32 = 768;
pub const SA32_SETTING: f64 = 0.5;
pub const SA64_SETTING: f64 = 0.5;
pub const OUTPUT_FORMAT: &str = "webp";
pub const GUIDANCE_SCALE: u32 = 5;
pub const OUTPUT_QUALITY: u32 = 80;
pub const STYLE_STRENGTH_RATIO: u32 = 20;
pub const COMIC_STYLE: &str = "Classic Comic Style";
pub const NEGATIVE_PROMPT: &str = "bad anatomy, bad hands, missing fingers, extra fingers, \
three hands, three legs, bad arms, missing legs, missing arms, poorly drawn face, bad face, \
fused face, cloned face, three crus, fused feet, fused thigh, extra crus, ugly fingers, horn, \
cartoon, cg, 3d, unreal, animate, amputation, disconnected limbs";

/// One generation call's worth of user input.
///
/// Sampling parameters are fixed; only the character, style and assembled
/// scenes vary. `num_ids` is taken from the prompt so it always matches the
/// number of panel lines.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    num_ids: u32,
    character_description: String,
    comic_description: String,
    style_name: String,
}

impl GenerationRequest {
    pub fn new(
        character_description: impl Into<String>,
        style_name: impl Into<String>,
        prompt: StoryPrompt,
    ) -> Self {
        Self {
            // Bounded by MAX_SCENES during assembly.
            num_ids: prompt.scene_count() as u32,
            character_description: character_description.into(),
            comic_description: prompt.into_text(),
            style_name: style_name.into(),
        }
    }

    pub fn num_ids(&self) -> u32 {
        self.num_ids
    }

    pub fn character_description(&self) -> &str {
        &self.character_description
    }

    pub fn comic_description(&self) -> &str {
        &self.comic_description
    }

    pub fn style_name(&self) -> &str {
        &self.style_name
    }

    /// Ordered `(wire key, value)` pairs sent as form parts.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("seed", SEED.to_string()),
            ("num_ids", self.num_ids.to_string()),
            ("sd_model", SD_MODEL.to_string()),
            ("num_steps", NUM_STEPS.to_string()),
            ("image_width", IMAGE_WIDTH.to_string()),
            ("image_height", IMAGE_HEIGHT.to_string()),
            ("sa32_setting", SA32_SETTING.to_string()),
            ("sa64_setting", SA64_SETTING.to_string()),
            ("output_format", OUTPUT_FORMAT.to_string()),
            ("guidance_scale", GUIDANCE_SCALE.to_string()),
            ("output_quality", OUTPUT_QUALITY.to_string()),
            ("negative_prompt", NEGATIVE_PROMPT.to_string()),
            (
                "character_description",
                self.character_description.clone(),
            ),
            ("comic_description", self.comic_description.clone()),
            ("style_strength_ratio", STYLE_STRENGTH_RATIO.to_string()),
            ("style_name", self.style_name.clone()),
            ("comic_style", COMIC_STYLE.to_string()),
        ]
    }

    /// Build a new multipart form; each call gets a fresh random boundary.
    pub fn to_multipart(&self) -> Form {
        self.form_fields()
            .into_iter()
            .fold(Form::new(), |form, (key, value)| form.text(key, value))
    }
}
