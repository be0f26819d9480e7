//! Data models and structures
//!
//! Defines the story inputs the caller collects from its forms (character,
//! story setup, scenes) and the configuration for the image service.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Maximum number of scenes rendered into one comic page.
pub const MAX_SCENES: usize = 6;

/// Art styles offered to users when creating a character.
pub const ART_STYLES: [&str; 6] = [
    "Disney Charactor",
    "Realistic",
    "Watercolor",
    "Pixel Art",
    "3D",
    "Minimal",
];

/// One user-authored panel description.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SceneInput {
    pub text: String,
    /// Render this panel without the recurring character.
    pub hide_character: bool,
}

impl SceneInput {
    pub fn new(text: impl Into<String>, hide_character: bool) -> Self {
        Self {
            text: text.into(),
            hide_character,
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.text.trim().is_empty()
    }

    /// Combine the parallel text/flag arrays kept by the page form.
    ///
    /// A text without a matching flag keeps the character in the panel.
    pub fn pair_up(texts: &[String], hide_character_flags: &[bool]) -> Vec<Self> {
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let hide = hide_character_flags.get(i).copied().unwrap_or(false);
                Self::new(text.clone(), hide)
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Character {
    pub description: String,
    pub traits: Vec<String>,
    pub style: String,
    pub age: String,
    pub gender: String,
    pub occupation: String,
}

impl Character {
    pub fn is_valid(&self) -> bool {
        !self.description.is_empty() && !self.traits.is_empty() && !self.style.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct StorySetup {
    pub setting: String,
    pub time_of_day: String,
    pub mood: String,
    pub theme: String,
}

impl StorySetup {
    pub fn is_valid(&self) -> bool {
        !self.setting.is_empty()
            && !self.time_of_day.is_empty()
            && !self.mood.is_empty()
            && !self.theme.is_empty()
    }
}

// Configuration
pub const DEFAULT_ENDPOINT: &str = "https://api.segmind.com/v1/storydiffusion";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(180);
pub const DEFAULT_BACKOFF_UNIT: Duration = Duration::from_secs(2);

const API_KEY_VAR: &str = "STORY_DIFFUSION_API_KEY";
const ENDPOINT_VAR: &str = "STORY_DIFFUSION_URL";
const TIMEOUT_VAR: &str = "STORY_DIFFUSION_TIMEOUT_SECS";

#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub endpoint: String,
    /// Applies to each attempt, from connect until the body is read.
    pub timeout: Duration,
    /// Attempt `n` is followed by a wait of `n * backoff_unit`.
    pub backoff_unit: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"[REDACTED]")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .field("backoff_unit", &self.backoff_unit)
            .finish()
    }
}

impl Config {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            backoff_unit: DEFAULT_BACKOFF_UNIT,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_backoff_unit(mut self, backoff_unit: Duration) -> Self {
        self.backoff_unit = backoff_unit;
        self
    }

    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> crate::Result<Self> {
        let api_key = lookup(API_KEY_VAR)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| crate::Error::Config(format!("{} not set", API_KEY_VAR)))?;

        let mut config = Self::new(api_key);

        if let Some(endpoint) = lookup(ENDPOINT_VAR) {
            config.endpoint = endpoint;
        }

        if let Some(raw) = lookup(TIMEOUT_VAR) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                crate::Error::Config(format!(
                    "{} must be a whole number of seconds, got '{}'",
                    TIMEOUT_VAR, raw
                ))
            })?;
            if secs == 0 {
                return Err(crate::Error::Config(format!(
                    "{} must be greater than zero",
                    TIMEOUT_VAR
                )));
            }
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_scene_validity_ignores_whitespace() {
        assert!(SceneInput::new("at home, reading", false).is_valid());
        assert!(!SceneInput::new("   ", false).is_valid());
        assert!(!SceneInput::new("\n\t", true).is_valid());
        assert!(!SceneInput::new("", false).is_valid());
    }

    #[test]
    fn test_pair_up_defaults_missing_flags() {
        let texts = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let scenes = SceneInput::pair_up(&texts, &[true]);

        assert_eq!(scenes.len(), 3);
        assert!(scenes[0].hide_character);
        assert!(!scenes[1].hide_character);
        assert!(!scenes[2].hide_character);
        assert_eq!(scenes[2].text, "c");
    }

    #[test]
    fn test_character_validation() {
        let mut character = Character {
            description: "a curious fox".to_string(),
            traits: vec!["brave".to_string()],
            style: "Watercolor".to_string(),
            ..Default::default()
        };
        assert!(character.is_valid());

        character.traits.clear();
        assert!(!character.is_valid());
    }

    #[test]
    fn test_story_setup_validation() {
        let setup = StorySetup {
            setting: "forest".to_string(),
            time_of_day: "dusk".to_string(),
            mood: "calm".to_string(),
            theme: String::new(),
        };
        assert!(!setup.is_valid());
        assert!(StorySetup {
            theme: "Adventure".to_string(),
            ..setup
        }
        .is_valid());
    }

    #[test]
    fn test_models_serialize_camel_case() {
        let setup = StorySetup {
            time_of_day: "night".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_string(&setup).unwrap();
        assert!(json.contains("\"timeOfDay\":\"night\""));

        let scene: SceneInput =
            serde_json::from_str(r#"{"text":"empty garden","hideCharacter":true}"#).unwrap();
        assert!(scene.hide_character);
    }

    #[test]
    fn test_character_deserializes_with_missing_fields() {
        let character: Character = serde_json::from_str(r#"{"description":"a robot"}"#).unwrap();
        assert_eq!(character.description, "a robot");
        assert!(character.traits.is_empty());
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(lookup_from(&[(API_KEY_VAR, "secret")])).unwrap();
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.timeout, Duration::from_secs(180));
        assert_eq!(config.backoff_unit, Duration::from_secs(2));
    }

    #[test]
    fn test_config_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            (API_KEY_VAR, "secret"),
            (ENDPOINT_VAR, "http://localhost:9000/generate"),
            (TIMEOUT_VAR, "30"),
        ]))
        .unwrap();
        assert_eq!(config.endpoint, "http://localhost:9000/generate");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_config_requires_api_key() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));

        let err = Config::from_lookup(lookup_from(&[(API_KEY_VAR, "  ")])).unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_config_rejects_bad_timeout() {
        let err = Config::from_lookup(lookup_from(&[(API_KEY_VAR, "k"), (TIMEOUT_VAR, "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains(TIMEOUT_VAR));
    }

    #[test]
    fn test_config_rejects_zero_timeout() {
        let err = Config::from_lookup(lookup_from(&[(API_KEY_VAR, "k"), (TIMEOUT_VAR, "0")]))
            .unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
        assert!(err.to_string().contains(TIMEOUT_VAR));
    }

    #[test]
    fn test_config_debug_redacts_api_key() {
        let debug = format!("{:?}", Config::new("super-secret-key"));
        assert!(!debug.contains("super-secret-key"));
        assert!(debug.contains("REDACTED"));
    }
}
