use thiserror::Error;

/// Errors raised while setting a game up. Game-logic problems never surface here;
/// they are reported as [`IllegalAction`] messages on the state instead.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("unknown difficulty '{0}' (expected easy, medium or hard)")]
    UnknownDifficulty(String),
    #[error("unrecognized bot spec: {0}")]
    UnknownBot(String),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reasons the rules engine refuses an action.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IllegalAction {
    #[error("the game is over; start a new game to keep playing")]
    GameOver,
    #[error("select a card first")]
    NothingSelected,
    #[error("hand slot {0} is out of range")]
    HandIndex(usize),
    #[error("hand slot {0} is empty")]
    EmptyHandSlot(usize),
    #[error("discard pile {0} does not exist")]
    DiscardIndex(usize),
    #[error("build pile {0} does not exist")]
    BuildPileIndex(usize),
    #[error("your stock pile is empty")]
    EmptyStock,
    #[error("discard pile {0} is empty")]
    EmptyDiscard(usize),
    #[error("the selected card is no longer where it was selected from")]
    StaleSelection,
    #[error("build pile {pile} needs a {required} or a Skip-Bo card")]
    CardMismatch { pile: usize, required: u8 },
    #[error("build pile {0} is already complete")]
    PileFull(usize),
    #[error("only cards from your hand can be discarded")]
    NotFromHand,
    #[error("Skip-Bo cards cannot be discarded")]
    SkipBoDiscard,
}
