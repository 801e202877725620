use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::card::Card;
use crate::error::GameError;

/// Zero-based index of a player within the game.
pub type PlayerId = usize;

/// Location a card can be taken from when selecting it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum CardSource {
    /// Card held in the given hand slot.
    Hand(usize),
    /// Top card of the player's stock pile.
    Stock,
    /// Top card of one of the player's discard piles.
    Discard(usize),
}

/// The card a player is about to play or discard.
///
/// The card is copied out of its source when selected so later pile mutations
/// cannot change what was selected.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub card: Card,
    pub source: CardSource,
}

/// Strength of the AI opponent.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(GameError::UnknownDifficulty(s.to_string())),
        }
    }
}

/// Everything that can be fed to the rules engine.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameAction {
    /// Start the first game.
    Init,
    /// Throw the current game away and deal a new one.
    Reset,
    /// Fill empty hand slots of the current player, at most `count` of them.
    Draw { count: Option<usize> },
    SelectCard { source: CardSource },
    ClearSelection,
    /// Play the selected card onto a build pile.
    PlayCard { build_pile: usize },
    /// Put the selected hand card onto a discard pile, ending the turn.
    DiscardCard { discard_pile: usize },
    EndTurn,
    SetDifficulty { difficulty: Difficulty },
}

impl GameAction {
    /// Actions a view layer may dispatch on behalf of a human player.
    pub fn is_dispatchable(&self) -> bool {
        !matches!(self, GameAction::Draw { .. })
    }

    /// Actions that start a fresh game.
    pub fn is_restart(&self) -> bool {
        matches!(self, GameAction::Init | GameAction::Reset)
    }

    /// Actions that move cards on behalf of the current player.
    pub fn is_turn_action(&self) -> bool {
        matches!(
            self,
            GameAction::SelectCard { .. }
                | GameAction::ClearSelection
                | GameAction::PlayCard { .. }
                | GameAction::DiscardCard { .. }
                | GameAction::EndTurn
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_parses_case_insensitively() {
        assert_eq!("Hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert_eq!(" easy ".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert!(matches!(
            "brutal".parse::<Difficulty>(),
            Err(GameError::UnknownDifficulty(_))
        ));
    }

    #[test]
    fn actions_serialize_with_type_tags() {
        let json = serde_json::to_string(&GameAction::PlayCard { build_pile: 2 }).unwrap();
        assert_eq!(json, r#"{"type":"PLAY_CARD","build_pile":2}"#);
        let parsed: GameAction =
            serde_json::from_str(r#"{"type":"SET_DIFFICULTY","difficulty":"hard"}"#).unwrap();
        assert_eq!(
            parsed,
            GameAction::SetDifficulty {
                difficulty: Difficulty::Hard
            }
        );
    }

    #[test]
    fn draw_is_not_dispatchable() {
        assert!(!GameAction::Draw { count: None }.is_dispatchable());
        assert!(GameAction::EndTurn.is_dispatchable());
        assert!(GameAction::Reset.is_restart());
    }
}
