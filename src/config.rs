use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigErrorReason, GameError};
use crate::grid::{MAX_SIZE, MIN_SIZE, Tile};

/// Default number of generator attempts before giving up.
pub const DEFAULT_MAX_ATTEMPTS: usize = 5000;

/// Glyph used for each tile kind when rendering. The engine itself never reads these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Appearance {
    pub player: String,
    #[serde(rename = "box")]
    pub box_: String,
    pub box_on_goal: String,
    pub goal: String,
    pub wall: String,
    pub floor: String,
}

impl Default for Appearance {
    fn default() -> Self {
        Appearance {
            player: "😄".to_string(),
            box_: "📦".to_string(),
            box_on_goal: "✅".to_string(),
            goal: "📥".to_string(),
            wall: "🚧".to_string(),
            floor: "⬛".to_string(),
        }
    }
}

impl Appearance {
    /// Plain XSB characters.
    pub fn ascii() -> Self {
        Appearance {
            player: "@".to_string(),
            box_: "$".to_string(),
            box_on_goal: "*".to_string(),
            goal: ".".to_string(),
            wall: "#".to_string(),
            floor: " ".to_string(),
        }
    }

    pub fn glyph(&self, tile: Tile) -> &str {
        match tile {
            Tile::Player => &self.player,
            Tile::Box => &self.box_,
            Tile::BoxOnGoal => &self.box_on_goal,
            Tile::Goal => &self.goal,
            Tile::Wall => &self.wall,
            Tile::Floor => &self.floor,
        }
    }

    fn named_glyphs(&self) -> [(&'static str, &str); 6] {
        [
            ("player", self.player.as_str()),
            ("box", self.box_.as_str()),
            ("boxOnGoal", self.box_on_goal.as_str()),
            ("goal", self.goal.as_str()),
            ("wall", self.wall.as_str()),
            ("floor", self.floor.as_str()),
        ]
    }

    /// Glyphs must be non-empty and pairwise distinct.
    pub fn validate(&self) -> Result<(), ConfigErrorReason> {
        let glyphs = self.named_glyphs();
        for (i, (name, glyph)) in glyphs.iter().enumerate() {
            if glyph.is_empty() {
                return Err(ConfigErrorReason::EmptyGlyph(*name));
            }
            if glyphs[..i].iter().any(|(_, other)| other == glyph) {
                return Err(ConfigErrorReason::DuplicateGlyph(glyph.to_string()));
            }
        }
        Ok(())
    }
}

/// Settings for a new game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    pub width: usize,
    pub height: usize,
    #[serde(default = "default_boxes")]
    pub boxes: usize,
    #[serde(default, alias = "entityAppearance")]
    pub appearance: Appearance,
    /// Generator seed; a random seed is drawn when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
}

fn default_boxes() -> usize {
    1
}

fn default_max_attempts() -> usize {
    DEFAULT_MAX_ATTEMPTS
}

impl GameConfig {
    pub fn new(width: usize, height: usize) -> Self {
        GameConfig {
            width,
            height,
            boxes: default_boxes(),
            appearance: Appearance::default(),
            seed: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_boxes(mut self, boxes: usize) -> Self {
        self.boxes = boxes;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_appearance(mut self, appearance: Appearance) -> Self {
        self.appearance = appearance;
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self, GameError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, GameError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Check every constraint, failing on the first violated one.
    pub fn validate(&self) -> Result<(), GameError> {
        if self.width < MIN_SIZE {
            return Err(ConfigErrorReason::WidthTooSmall(self.width).into());
        }
        if self.height < MIN_SIZE {
            return Err(ConfigErrorReason::HeightTooSmall(self.height).into());
        }
        if self.width > MAX_SIZE {
            return Err(ConfigErrorReason::WidthTooLarge(self.width).into());
        }
        if self.height > MAX_SIZE {
            return Err(ConfigErrorReason::HeightTooLarge(self.height).into());
        }
        if self.boxes < 1 {
            return Err(ConfigErrorReason::NoBoxes.into());
        }
        let cells = self.width * self.height;
        if self.boxes > cells {
            return Err(ConfigErrorReason::TooManyBoxes {
                boxes: self.boxes,
                cells,
            }
            .into());
        }
        if self.max_attempts == 0 {
            return Err(ConfigErrorReason::ZeroAttempts.into());
        }
        self.appearance.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reason(config: &GameConfig) -> ConfigErrorReason {
        match config.validate() {
            Err(GameError::InvalidConfiguration(reason)) => reason,
            other => panic!("expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = GameConfig::new(5, 5);
        assert!(config.validate().is_ok());
        assert_eq!(config.boxes, 1);
        assert_eq!(config.appearance.player, "😄");
    }

    #[test]
    fn test_dimension_limits() {
        assert_eq!(
            reason(&GameConfig::new(4, 5)),
            ConfigErrorReason::WidthTooSmall(4)
        );
        assert_eq!(
            reason(&GameConfig::new(5, 4)),
            ConfigErrorReason::HeightTooSmall(4)
        );
        assert_eq!(
            reason(&GameConfig::new(65, 5)),
            ConfigErrorReason::WidthTooLarge(65)
        );
        assert_eq!(
            reason(&GameConfig::new(5, 65)),
            ConfigErrorReason::HeightTooLarge(65)
        );
    }

    #[test]
    fn test_box_count_limits() {
        assert_eq!(
            reason(&GameConfig::new(5, 5).with_boxes(0)),
            ConfigErrorReason::NoBoxes
        );
        assert_eq!(
            reason(&GameConfig::new(5, 5).with_boxes(26)),
            ConfigErrorReason::TooManyBoxes {
                boxes: 26,
                cells: 25
            }
        );
    }

    #[test]
    fn test_duplicate_glyph() {
        let appearance = Appearance {
            goal: "📦".to_string(),
            ..Appearance::default()
        };
        let config = GameConfig::new(5, 5).with_appearance(appearance);
        assert_eq!(
            reason(&config),
            ConfigErrorReason::DuplicateGlyph("📦".to_string())
        );
    }

    #[test]
    fn test_empty_glyph() {
        let appearance = Appearance {
            wall: String::new(),
            ..Appearance::default()
        };
        let config = GameConfig::new(5, 5).with_appearance(appearance);
        assert_eq!(reason(&config), ConfigErrorReason::EmptyGlyph("wall"));
    }

    #[test]
    fn test_zero_attempts() {
        let mut config = GameConfig::new(5, 5);
        config.max_attempts = 0;
        assert_eq!(reason(&config), ConfigErrorReason::ZeroAttempts);
    }

    #[test]
    fn test_ascii_appearance_is_valid() {
        assert!(Appearance::ascii().validate().is_ok());
    }

    #[test]
    fn test_from_json_defaults() {
        let config = GameConfig::from_json_str(r#"{ "width": 7, "height": 6 }"#).unwrap();
        assert_eq!(config.width, 7);
        assert_eq!(config.height, 6);
        assert_eq!(config.boxes, 1);
        assert_eq!(config.seed, None);
        assert_eq!(config.max_attempts, DEFAULT_MAX_ATTEMPTS);
        assert_eq!(config.appearance, Appearance::default());
    }

    #[test]
    fn test_from_json_partial_appearance() {
        let json = r#"{
            "width": 8,
            "height": 8,
            "boxes": 2,
            "seed": 42,
            "entityAppearance": { "player": "P", "boxOnGoal": "B" }
        }"#;
        let config = GameConfig::from_json_str(json).unwrap();
        assert_eq!(config.boxes, 2);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.appearance.player, "P");
        assert_eq!(config.appearance.box_on_goal, "B");
        assert_eq!(config.appearance.wall, "🚧");
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(matches!(
            GameConfig::from_json_str("{ \"width\": \"wide\" }"),
            Err(GameError::Json(_))
        ));
    }

    #[test]
    fn test_from_file_missing() {
        assert!(matches!(
            GameConfig::from_file("nonexistent_config.json"),
            Err(GameError::Io(_))
        ));
    }
}
