//! Game configuration, presentation pacing and stored user preferences.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::card::{
    BUILD_PILE_COUNT, COPIES_PER_VALUE, DISCARD_PILE_COUNT, HAND_SIZE, MAX_CARD_VALUE,
    PLAYER_COUNT, SKIP_BO_COUNT, STOCK_SIZE, deck_size,
};
use crate::error::GameError;

/// Largest card value a configuration may ask for.
pub const MAX_SUPPORTED_VALUE: u8 = 99;

/// Integer table read at game start.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GameConfig {
    pub hand_size: usize,
    pub stock_size: usize,
    pub discard_piles: usize,
    pub build_piles: usize,
    pub max_value: u8,
    pub copies_per_value: usize,
    pub skip_bo_cards: usize,
    /// Which seats the AI engine controls.
    pub ai_seats: [bool; PLAYER_COUNT],
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            hand_size: HAND_SIZE,
            stock_size: STOCK_SIZE,
            discard_piles: DISCARD_PILE_COUNT,
            build_piles: BUILD_PILE_COUNT,
            max_value: MAX_CARD_VALUE,
            copies_per_value: COPIES_PER_VALUE,
            skip_bo_cards: SKIP_BO_COUNT,
            ai_seats: [false, true],
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), GameError> {
        if self.hand_size == 0 {
            return Err(GameError::InvalidConfiguration(
                "hand size must be positive".into(),
            ));
        }
        if self.stock_size == 0 {
            return Err(GameError::InvalidConfiguration(
                "stock size must be positive".into(),
            ));
        }
        if self.discard_piles == 0 || self.build_piles == 0 {
            return Err(GameError::InvalidConfiguration(
                "there must be at least one discard pile and one build pile".into(),
            ));
        }
        if self.max_value == 0 || self.copies_per_value == 0 {
            return Err(GameError::InvalidConfiguration(
                "numbered cards must cover at least one value".into(),
            ));
        }
        if self.max_value > MAX_SUPPORTED_VALUE {
            return Err(GameError::InvalidConfiguration(format!(
                "card values above {MAX_SUPPORTED_VALUE} are not supported, got {}",
                self.max_value
            )));
        }
        let needed = self.stock_size * PLAYER_COUNT;
        let available = deck_size(self);
        if available < needed {
            return Err(GameError::InvalidConfiguration(format!(
                "deck of {available} cards cannot deal two stock piles of {}",
                self.stock_size
            )));
        }
        Ok(())
    }

    /// Applies stored preferences on top of this configuration.
    pub fn with_preferences(mut self, preferences: &Preferences) -> Self {
        if let Some(stock_size) = preferences.stock_size {
            self.stock_size = stock_size;
        }
        self
    }

    pub fn with_stock_size(mut self, stock_size: usize) -> Self {
        self.stock_size = stock_size;
        self
    }

    pub fn with_ai_seats(mut self, ai_seats: [bool; PLAYER_COUNT]) -> Self {
        self.ai_seats = ai_seats;
        self
    }
}

/// Minimum presentation times, in milliseconds.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PacingConfig {
    pub draw_ms: u64,
    pub play_ms: u64,
    pub discard_ms: u64,
    pub think_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            draw_ms: 300,
            play_ms: 400,
            discard_ms: 400,
            think_ms: 600,
        }
    }
}

impl PacingConfig {
    /// Pacing that never waits.
    pub fn instant() -> Self {
        Self {
            draw_ms: 0,
            play_ms: 0,
            discard_ms: 0,
            think_ms: 0,
        }
    }

    pub fn draw(&self) -> Duration {
        Duration::from_millis(self.draw_ms)
    }

    pub fn play(&self) -> Duration {
        Duration::from_millis(self.play_ms)
    }

    pub fn discard(&self) -> Duration {
        Duration::from_millis(self.discard_ms)
    }

    pub fn think(&self) -> Duration {
        Duration::from_millis(self.think_ms)
    }
}

/// Everything a host reads from disk before starting a game.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    pub game: GameConfig,
    pub pacing: PacingConfig,
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self, GameError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, GameError> {
        let config: EngineConfig = serde_json::from_str(text)?;
        config.game.validate()?;
        Ok(config)
    }
}

/// User preferences remembered between sessions.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Preferences {
    pub stock_size: Option<usize>,
}

impl Preferences {
    /// Reads stored preferences; a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, GameError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), GameError> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_the_standard_game() {
        let config = GameConfig::default();
        assert_eq!(config.hand_size, 5);
        assert_eq!(config.stock_size, 30);
        assert_eq!(deck_size(&config), 162);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn stored_stock_size_overrides_default() {
        let preferences = Preferences {
            stock_size: Some(10),
        };
        let config = GameConfig::default().with_preferences(&preferences);
        assert_eq!(config.stock_size, 10);
        let untouched = GameConfig::default().with_preferences(&Preferences::default());
        assert_eq!(untouched.stock_size, 30);
    }

    #[test]
    fn rejects_stock_larger_than_deck() {
        let config = GameConfig::default().with_stock_size(100);
        assert!(matches!(
            config.validate(),
            Err(GameError::InvalidConfiguration(_))
        ));
        assert!(GameConfig::default().with_stock_size(0).validate().is_err());
    }

    #[test]
    fn rejects_card_values_out_of_range() {
        let config = EngineConfig::from_json(r#"{"game": {"max_value": 255, "copies_per_value": 1}}"#);
        assert!(matches!(config, Err(GameError::InvalidConfiguration(_))));
        let widest = GameConfig {
            max_value: MAX_SUPPORTED_VALUE,
            copies_per_value: 1,
            ..GameConfig::default()
        };
        assert!(widest.validate().is_ok());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config = EngineConfig::from_json(r#"{"game": {"stock_size": 20}, "pacing": {"think_ms": 0}}"#)
            .expect("valid config");
        assert_eq!(config.game.stock_size, 20);
        assert_eq!(config.game.hand_size, 5);
        assert_eq!(config.pacing.think_ms, 0);
        assert_eq!(config.pacing.play_ms, PacingConfig::default().play_ms);
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(
            EngineConfig::from_json("{not json"),
            Err(GameError::Json(_))
        ));
    }

    #[test]
    fn preferences_round_trip_through_disk() {
        let path = std::env::temp_dir().join(format!("skipbo-prefs-{}.json", std::process::id()));
        let preferences = Preferences {
            stock_size: Some(15),
        };
        preferences.save(&path).expect("save");
        let loaded = Preferences::load_or_default(&path).expect("load");
        assert_eq!(loaded, preferences);
        let _ = fs::remove_file(&path);
        let missing = Preferences::load_or_default(&path).expect("missing file");
        assert_eq!(missing, Preferences::default());
    }
}
