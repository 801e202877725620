use crate::action::GameAction;
use crate::state::GameState;

/// Decision collaborator for AI-controlled seats.
///
/// Called with a snapshot in which the current player is the bot; returns exactly one
/// action to apply. Implementations only read the snapshot.
pub trait Bot: Send {
    fn decide(&mut self, state: &GameState) -> GameAction;
}

impl<B: Bot + ?Sized> Bot for Box<B> {
    fn decide(&mut self, state: &GameState) -> GameAction {
        (**self).decide(state)
    }
}
