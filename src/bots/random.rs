use rand::Rng;
use rand::seq::SliceRandom;

use crate::action::GameAction;
use crate::bot::Bot;
use crate::rules;
use crate::state::GameState;

/// Baseline bot that samples uniformly from the legal turn actions.
pub struct RandomBot<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomBot<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng + Send> Bot for RandomBot<R> {
    fn decide(&mut self, state: &GameState) -> GameAction {
        rules::legal_actions(state)
            .choose(&mut self.rng)
            .cloned()
            .unwrap_or(GameAction::EndTurn)
    }
}
