use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use storyverse_generator::models::{Character, Config, SceneInput, StorySetup, ART_STYLES};
use storyverse_generator::story::StoryGenerator;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "storyverse-generator")]
#[command(about = "Render story scenes into a single comic page")]
struct CliArgs {
    /// Scene description, one panel each, in reading order.
    #[arg(long = "scene", value_name = "TEXT", required = true)]
    scenes: Vec<String>,

    /// 1-based index of a scene to render without the character.
    #[arg(long = "hide", value_name = "INDEX")]
    hidden: Vec<usize>,

    /// Appearance of the recurring character.
    #[arg(long, value_name = "TEXT")]
    character: String,

    /// Character trait (repeatable).
    #[arg(long = "trait", value_name = "TRAIT")]
    traits: Vec<String>,

    #[arg(long, default_value = "Realistic", value_parser = clap::builder::PossibleValuesParser::new(ART_STYLES))]
    style: String,

    #[arg(long, default_value = "")]
    setting: String,

    #[arg(long, default_value = "")]
    theme: String,

    #[arg(long, default_value = "")]
    mood: String,

    #[arg(long, default_value = "")]
    time_of_day: String,

    /// Where to write the rendered image.
    #[arg(long, short, default_value = "story.webp")]
    output: PathBuf,
}

impl CliArgs {
    fn scene_inputs(&self) -> Vec<SceneInput> {
        let flags: Vec<bool> = (1..=self.scenes.len())
            .map(|index| self.hidden.contains(&index))
            .collect();
        SceneInput::pair_up(&self.scenes, &flags)
    }

    fn character(&self) -> Character {
        Character {
            description: self.character.clone(),
            traits: self.traits.clone(),
            style: self.style.clone(),
            ..Default::default()
        }
    }

    fn story_setup(&self) -> StorySetup {
        StorySetup {
            setting: self.setting.clone(),
            time_of_day: self.time_of_day.clone(),
            mood: self.mood.clone(),
            theme: self.theme.clone(),
        }
    }
}

async fn run(args: &CliArgs) -> Result<()> {
    let config = Config::from_env()?;
    let generator = StoryGenerator::from_config(&config)?;

    let image = generator
        .generate_story_image(&args.scene_inputs(), &args.character(), &args.story_setup())
        .await?;

    tokio::fs::write(&args.output, image.bytes())
        .await
        .with_context(|| format!("Failed to write image to {}", args.output.display()))?;
    info!(
        "Saved {}x{} {} to {}",
        image.width(),
        image.height(),
        image.mime_type(),
        args.output.display()
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storyverse_generator=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting storyverse-generator");

    let args = CliArgs::parse();

    match run(&args).await {
        Ok(_) => {
            info!("Generation completed successfully");
            Ok(())
        }
        Err(e) => {
            error!("Generation failed: {:#}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CliArgs;
    use clap::Parser;

    #[test]
    fn test_hidden_indices_map_to_scenes() {
        let args = CliArgs::try_parse_from([
            "storyverse-generator",
            "--scene",
            "a fox wakes up",
            "--scene",
            "an empty den",
            "--scene",
            "the fox runs",
            "--hide",
            "2",
            "--character",
            "a small red fox",
        ])
        .unwrap();

        let scenes = args.scene_inputs();
        assert_eq!(scenes.len(), 3);
        assert!(!scenes[0].hide_character);
        assert!(scenes[1].hide_character);
        assert_eq!(scenes[1].text, "an empty den");
        assert!(!scenes[2].hide_character);
    }

    #[test]
    fn test_defaults() {
        let args = CliArgs::try_parse_from([
            "storyverse-generator",
            "--scene",
            "a fox",
            "--character",
            "fox",
            "--trait",
            "quick",
            "--trait",
            "sly",
            "--theme",
            "Adventure",
        ])
        .unwrap();

        assert_eq!(args.output.to_string_lossy(), "story.webp");
        let character = args.character();
        assert_eq!(character.style, "Realistic");
        assert_eq!(character.traits, vec!["quick", "sly"]);
        assert_eq!(args.story_setup().theme, "Adventure");
        assert!(args.story_setup().setting.is_empty());
    }

    #[test]
    fn test_unknown_style_rejected() {
        let result = CliArgs::try_parse_from([
            "storyverse-generator",
            "--scene",
            "a fox",
            "--character",
            "fox",
            "--style",
            "Oil Painting",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_scene_required() {
        let result = CliArgs::try_parse_from(["storyverse-generator", "--character", "fox"]);
        assert!(result.is_err());
    }
}
