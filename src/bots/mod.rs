pub mod difficulty;
pub mod engine;
pub mod heuristics;
pub mod lookahead;
pub mod random;
pub mod registry;

pub use difficulty::DifficultyProfile;
pub use engine::AiEngine;
pub use random::RandomBot;
pub use registry::{SeatedBots, create_bot_from_spec, label_for_spec};

use crate::action::{CardSource, GameAction};
use crate::card::Card;

/// What a bot intends to do with a card once it is selected.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Step {
    Play(usize),
    Discard(usize),
}

impl Step {
    pub fn is_play(&self) -> bool {
        matches!(self, Step::Play(_))
    }

    pub fn action(&self) -> GameAction {
        match *self {
            Step::Play(build_pile) => GameAction::PlayCard { build_pile },
            Step::Discard(discard_pile) => GameAction::DiscardCard { discard_pile },
        }
    }
}

/// A complete move: which card, from where, and where it goes.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Move {
    pub source: CardSource,
    pub card: Card,
    pub step: Step,
}
