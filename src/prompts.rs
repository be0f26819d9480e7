//! Prompt assembly for multi-panel comic generation
//!
//! Each valid scene becomes one line of the prompt; the image model splits
//! panels on line breaks. It has no separate field for story-wide context, so
//! the setting, theme, mood, time and character traits are repeated on every
//! line.

use crate::models::{Character, SceneInput, StorySetup, MAX_SCENES};
use crate::{Error, Result};

/// Marks a panel that must not show the recurring character.
pub const NO_CHARACTER_TAG: &str = "[NC] ";

/// A fully assembled prompt together with the number of panels it describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryPrompt {
    text: String,
    scene_count: usize,
}

impl StoryPrompt {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn scene_count(&self) -> usize {
        self.scene_count
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n')
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

/// Build the comic prompt from the user's scenes and story context.
///
/// Blank scenes are dropped and the remaining ones keep their original order.
pub fn assemble(
    scenes: &[SceneInput],
    character: &Character,
    setup: &StorySetup,
) -> Result<StoryPrompt> {
    let valid: Vec<&SceneInput> = scenes.iter().filter(|scene| scene.is_valid()).collect();

    if valid.is_empty() {
        return Err(Error::EmptyInput);
    }
    if valid.len() > MAX_SCENES {
        return Err(Error::TooManyScenes(valid.len()));
    }

    let context = context_suffix(character, setup);
    let text = valid
        .iter()
        .map(|scene| format_scene(scene, &context))
        .collect::<Vec<_>>()
        .join("\n");

    tracing::debug!(
        "Assembled prompt with {} scenes ({} of {} inputs were blank)",
        valid.len(),
        scenes.len() - valid.len(),
        scenes.len()
    );

    Ok(StoryPrompt {
        text,
        scene_count: valid.len(),
    })
}

fn format_scene(scene: &SceneInput, context: &str) -> String {
    let prefix = if scene.hide_character {
        NO_CHARACTER_TAG
    } else {
        ""
    };
    format!("{}{}{}", prefix, single_line(&scene.text), context)
}

/// Line breaks inside a scene would split it into extra panels.
fn single_line(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\r', '\n'], " ")
}

/// Story-wide clauses appended to every scene line, in fixed order.
///
/// A clause is left out entirely when its field is empty.
pub fn context_suffix(character: &Character, setup: &StorySetup) -> String {
    let traits = character.traits.join(", ");
    let clauses = [
        (", in ", setup.setting.as_str()),
        (", theme: ", setup.theme.as_str()),
        (", mood: ", setup.mood.as_str()),
        (", time: ", setup.time_of_day.as_str()),
        (", character traits: ", traits.as_str()),
    ];

    clauses
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(label, value)| format!("{}{}", label, value))
        .collect()
}
