//! Skip-Bo game engine: a pure rules reducer, an async turn machine that paces
//! play for a presentation layer, and computer opponents at three difficulty levels.

pub mod action;
pub mod bot;
pub mod bots;
pub mod card;
pub mod config;
pub mod error;
pub mod machine;
pub mod presenter;
pub mod rules;
pub mod score;
pub mod state;
pub mod visualize;

pub use crate::action::{CardSource, Difficulty, GameAction, PlayerId, Selection};
pub use crate::bot::Bot;
pub use crate::bots::{AiEngine, DifficultyProfile, RandomBot, SeatedBots};
pub use crate::card::{Card, PlayedCard};
pub use crate::config::{EngineConfig, GameConfig, PacingConfig, Preferences};
pub use crate::error::{GameError, IllegalAction};
pub use crate::machine::{Phase, TurnMachine, TurnStep};
pub use crate::presenter::{CardLocation, CardMotion, Immediate, Paced, Presentation, Presenter};
pub use crate::rules::Transition;
pub use crate::state::{BuildPile, GameState, PlayerState};
pub use crate::score::winner_points;
pub use crate::visualize::{VisualOptions, describe_action, render_state};
