use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::action::{Difficulty, GameAction};
use crate::bot::Bot;
use crate::bots::{AiEngine, RandomBot};
use crate::card::PLAYER_COUNT;
use crate::error::GameError;
use crate::state::GameState;

/// Returns a normalized label for a bot spec: the head token before any ':', keeping
/// the difficulty of AI bots so different levels are told apart.
pub fn label_for_spec(spec: &str) -> String {
    let normalized = spec.trim().to_ascii_lowercase();
    match normalized.split_once(':') {
        Some((head, level)) if head.trim() == "ai" => format!("ai:{}", level.trim()),
        Some((head, _)) => head.trim().to_string(),
        None => normalized,
    }
}

/// Create a bot instance from a CLI-style spec.
/// Supported specs:
/// - ai (plays at the difficulty stored in the game state)
/// - ai:easy, ai:medium, ai:hard
/// - random[:seed]
pub fn create_bot_from_spec(spec: &str, index: usize, seed: u64) -> Result<Box<dyn Bot>, GameError> {
    let spec_lower = spec.trim().to_ascii_lowercase();
    let argument = spec_lower
        .split_once(':')
        .map(|(_, value)| value.trim().to_string());
    let bot_seed = seed ^ ((index as u64 + 1) * 0x9E37_79B9);
    let head = spec_lower.split(':').next().unwrap_or_default().trim();
    match head {
        "ai" => {
            let engine = AiEngine::new(bot_seed);
            match argument {
                Some(level) => Ok(Box::new(engine.with_difficulty(level.parse::<Difficulty>()?))),
                None => Ok(Box::new(engine)),
            }
        }
        "random" => {
            let custom_seed = argument
                .and_then(|value| value.parse::<u64>().ok())
                .unwrap_or(bot_seed);
            Ok(Box::new(RandomBot::new(StdRng::seed_from_u64(custom_seed))))
        }
        _ => Err(GameError::UnknownBot(spec.to_string())),
    }
}

/// One bot per seat; decisions are routed to whoever holds the turn.
pub struct SeatedBots {
    seats: [Box<dyn Bot>; PLAYER_COUNT],
}

impl SeatedBots {
    pub fn new(seats: [Box<dyn Bot>; PLAYER_COUNT]) -> Self {
        Self { seats }
    }

    pub fn from_specs(specs: [&str; PLAYER_COUNT], seed: u64) -> Result<Self, GameError> {
        Ok(Self::new([
            create_bot_from_spec(specs[0], 0, seed)?,
            create_bot_from_spec(specs[1], 1, seed)?,
        ]))
    }
}

impl Bot for SeatedBots {
    fn decide(&mut self, state: &GameState) -> GameAction {
        self.seats[state.current_player].decide(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_specs() {
        assert!(create_bot_from_spec("ai", 0, 1).is_ok());
        assert!(create_bot_from_spec("AI:Hard", 1, 1).is_ok());
        assert!(create_bot_from_spec("random:42", 0, 1).is_ok());
        assert!(matches!(
            create_bot_from_spec("ai:insane", 0, 1),
            Err(GameError::UnknownDifficulty(_))
        ));
        assert!(matches!(
            create_bot_from_spec("human", 0, 1),
            Err(GameError::UnknownBot(_))
        ));
        assert_eq!(label_for_spec("AI:Hard"), "ai:hard");
        assert_eq!(label_for_spec("random:42"), "random");
    }
}
