//! Turn orchestration: the single owner of the game state.
//!
//! The machine moves through `Setup`, then alternates human and bot turns until
//! someone wins. Each turn starts by drawing; bot turns then loop through
//! thinking and applying actions until the bot hands the turn back. Drawing and
//! thinking await the presenter, and nothing else can touch the state while they do.

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, error, info, trace, warn};

use crate::action::{CardSource, GameAction, PlayerId, Selection};
use crate::bot::Bot;
use crate::card::Card;
use crate::config::GameConfig;
use crate::error::GameError;
use crate::presenter::{CardLocation, CardMotion, Presentation, Presenter};
use crate::rules::{self, Transition};
use crate::state::GameState;

/// Upper bound on actions a bot may take in one turn before it is made to stop.
pub const MAX_BOT_ACTIONS_PER_TURN: usize = 500;

/// Where a turn currently is.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum TurnStep {
    Drawing,
    Ready,
    Thinking,
    CheckState,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Phase {
    Setup,
    HumanTurn(TurnStep),
    BotTurn(TurnStep),
    /// Someone emptied their stock pile.
    Finished,
    /// The turn limit ran out without a winner.
    Stalled,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Finished | Phase::Stalled)
    }
}

pub struct TurnMachine<P, B> {
    state: GameState,
    phase: Phase,
    presenter: P,
    bot: B,
    rng: StdRng,
    snapshots: watch::Sender<GameState>,
    turns: usize,
    turn_limit: Option<usize>,
}

impl<P: Presenter, B: Bot> TurnMachine<P, B> {
    /// Deals a new game. Call [`TurnMachine::start`] to begin the first turn.
    pub fn new(config: GameConfig, presenter: P, bot: B, seed: u64) -> Result<Self, GameError> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(seed);
        let state = rules::apply(&GameState::empty(config), &GameAction::Init, &mut rng).state;
        let (snapshots, _) = watch::channel(state.clone());
        Ok(Self {
            state,
            phase: Phase::Setup,
            presenter,
            bot,
            rng,
            snapshots,
            turns: 0,
            turn_limit: None,
        })
    }

    /// Stop in [`Phase::Stalled`] after `turns` turn changes without a winner.
    pub fn with_turn_limit(mut self, turns: usize) -> Self {
        self.turn_limit = Some(turns);
        self
    }

    pub fn snapshot(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Number of turn changes so far in this game.
    pub fn turns(&self) -> usize {
        self.turns
    }

    /// Receiver that sees every committed state.
    pub fn subscribe(&self) -> watch::Receiver<GameState> {
        self.snapshots.subscribe()
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Leaves `Setup` and runs until a human has to act or the game ends.
    pub async fn start(&mut self) {
        if self.phase == Phase::Setup {
            self.route().await;
        }
    }

    /// Whether `action` would be accepted in the current phase.
    pub fn accepts(&self, action: &GameAction) -> bool {
        if !action.is_dispatchable() {
            return false;
        }
        match self.phase {
            Phase::Setup => !action.is_turn_action(),
            Phase::HumanTurn(TurnStep::Ready) => self.is_human_action(action),
            Phase::Finished | Phase::Stalled => action.is_restart(),
            Phase::HumanTurn(_) | Phase::BotTurn(_) => false,
        }
    }

    fn is_human_action(&self, action: &GameAction) -> bool {
        !action.is_turn_action() || !self.state.current().is_ai
    }

    /// Applies an action coming from the view layer.
    ///
    /// Returns `false`, without touching the state, when the current phase does not
    /// take this action. Otherwise the action is applied and the machine runs on
    /// (through any bot turns) until a human has to act again or the game ends.
    pub async fn dispatch(&mut self, action: GameAction) -> bool {
        if !self.accepts(&action) {
            trace!(?action, phase = ?self.phase, "dispatch ignored");
            return false;
        }
        let seat = self.state.current_player;
        let transition = rules::apply(&self.state, &action, &mut self.rng);
        self.present_refill(&action, &transition).await;
        self.commit(transition.state);
        if action.is_restart() {
            self.turns = 0;
            self.phase = Phase::Setup;
            self.route().await;
        } else if self.phase != Phase::Setup
            && (self.state.game_is_over || self.state.current_player != seat)
        {
            self.route().await;
        }
        true
    }

    /// Runs turns until a human is in `Ready` or the game has ended.
    async fn route(&mut self) {
        loop {
            if self.state.game_is_over {
                self.set_phase(Phase::Finished);
                info!(
                    winner = ?self.state.winner,
                    turns = self.turns,
                    "game over"
                );
                return;
            }
            if self.turn_limit.is_some_and(|limit| self.turns >= limit) {
                warn!(turns = self.turns, "turn limit reached without a winner");
                self.set_phase(Phase::Stalled);
                return;
            }
            let seat = self.state.current_player;
            if self.state.players[seat].is_ai {
                self.set_phase(Phase::BotTurn(TurnStep::Drawing));
                self.draw_for_turn().await;
                self.set_phase(Phase::BotTurn(TurnStep::Ready));
                if self.state.game_is_over || self.state.current_player != seat {
                    continue;
                }
                self.play_bot_turn(seat).await;
            } else {
                self.set_phase(Phase::HumanTurn(TurnStep::Drawing));
                self.draw_for_turn().await;
                self.set_phase(Phase::HumanTurn(TurnStep::Ready));
                if self.state.game_is_over || self.state.current_player != seat {
                    continue;
                }
                return;
            }
        }
    }

    /// Fills the current player's empty hand slots, presenting the cards first.
    async fn draw_for_turn(&mut self) {
        let player = self.state.current_player;
        let transition = rules::apply(&self.state, &GameAction::Draw { count: None }, &mut self.rng);
        let motions = drawn_motions(
            &self.state.players[player].hand,
            &transition.state.players[player].hand,
        );
        if !motions.is_empty() {
            debug!(player, cards = motions.len(), "drawing");
            self.presenter
                .present(&Presentation::Draw { player, motions })
                .await;
        }
        self.commit(transition.state);
    }

    /// Presents the cards drawn when a play from the hand emptied it.
    async fn present_refill(&mut self, action: &GameAction, transition: &Transition) {
        let GameAction::PlayCard { .. } = action else {
            return;
        };
        let Some(Selection {
            source: CardSource::Hand(slot),
            ..
        }) = self.state.selected_card
        else {
            return;
        };
        let player = self.state.current_player;
        if !transition.is_applied() || transition.state.current_player != player {
            return;
        }
        let mut emptied = self.state.players[player].hand.clone();
        if let Some(played) = emptied.get_mut(slot) {
            *played = None;
        }
        let motions = drawn_motions(&emptied, &transition.state.players[player].hand);
        if !motions.is_empty() {
            debug!(player, cards = motions.len(), "refilling emptied hand");
            self.presenter
                .present(&Presentation::Draw { player, motions })
                .await;
        }
    }

    /// Lets the bot act until the turn passes or the game ends.
    async fn play_bot_turn(&mut self, seat: PlayerId) {
        let mut actions = 0;
        loop {
            self.set_phase(Phase::BotTurn(TurnStep::Thinking));
            self.presenter
                .present(&Presentation::Think { player: seat })
                .await;
            let action = if actions < MAX_BOT_ACTIONS_PER_TURN {
                self.bot.decide(&self.state)
            } else {
                warn!(player = seat, actions, "bot turn ran too long, ending it");
                GameAction::EndTurn
            };
            actions += 1;

            if let Some(presentation) = self.presentation_for(&action) {
                self.presenter.present(&presentation).await;
            }
            let transition = rules::apply(&self.state, &action, &mut self.rng);
            self.present_refill(&action, &transition).await;
            let rejected = transition.outcome.clone().err();
            self.commit(transition.state);
            if let Some(reason) = rejected {
                error!(player = seat, ?action, %reason, "bot proposed an illegal action");
                let transition = rules::apply(&self.state, &GameAction::EndTurn, &mut self.rng);
                self.commit(transition.state);
            }

            self.set_phase(Phase::BotTurn(TurnStep::CheckState));
            if self.state.game_is_over || self.state.current_player != seat {
                return;
            }
        }
    }

    /// Card movement a bot action is about to cause, if it moves a card.
    fn presentation_for(&self, action: &GameAction) -> Option<Presentation> {
        let player = self.state.current_player;
        let selection = self.state.selected_card?;
        rules::check(&self.state, action).ok()?;
        let from = match selection.source {
            CardSource::Hand(slot) => CardLocation::Hand(slot),
            CardSource::Stock => CardLocation::Stock,
            CardSource::Discard(index) => CardLocation::Discard(index),
        };
        match action {
            GameAction::PlayCard { build_pile } => Some(Presentation::Play {
                player,
                motion: CardMotion {
                    card: selection.card,
                    from,
                    to: CardLocation::Build(*build_pile),
                },
            }),
            GameAction::DiscardCard { discard_pile } => Some(Presentation::Discard {
                player,
                motion: CardMotion {
                    card: selection.card,
                    from,
                    to: CardLocation::Discard(*discard_pile),
                },
            }),
            _ => None,
        }
    }

    fn commit(&mut self, state: GameState) {
        if state.current_player != self.state.current_player {
            self.turns += 1;
        }
        self.state = state;
        self.snapshots.send_replace(self.state.clone());
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            debug!(from = ?self.phase, to = ?phase, "phase change");
            self.phase = phase;
        }
    }
}

/// Deck-to-hand motions for every slot that went from empty to holding a card.
fn drawn_motions(before: &[Option<Card>], after: &[Option<Card>]) -> Vec<CardMotion> {
    before
        .iter()
        .zip(after.iter())
        .enumerate()
        .filter_map(|(slot, (old, new))| match (old, new) {
            (None, Some(card)) => Some(CardMotion {
                card: *card,
                from: CardLocation::Deck,
                to: CardLocation::Hand(slot),
            }),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;

    #[derive(Clone, Default)]
    struct Recorder {
        shown: Arc<Mutex<Vec<Presentation>>>,
    }

    impl Recorder {
        fn shown(&self) -> Vec<Presentation> {
            self.shown.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Presenter for Recorder {
        async fn present(&mut self, presentation: &Presentation) {
            self.shown.lock().unwrap().push(presentation.clone());
        }
    }

    /// Plays the given actions in order, then ends every turn.
    struct Script(Vec<GameAction>);

    impl Bot for Script {
        fn decide(&mut self, _state: &GameState) -> GameAction {
            if self.0.is_empty() {
                GameAction::EndTurn
            } else {
                self.0.remove(0)
            }
        }
    }

    #[tokio::test]
    async fn human_emptying_the_hand_presents_the_refill() {
        let recorder = Recorder::default();
        let mut machine =
            TurnMachine::new(GameConfig::default(), recorder.clone(), Script(Vec::new()), 21).unwrap();
        machine.start().await;
        machine.state.players[0].hand = vec![Some(Card::Number(1)), None, None, None, None];
        machine.state.selected_card = Some(Selection {
            card: Card::Number(1),
            source: CardSource::Hand(0),
        });
        let already_shown = recorder.shown().len();

        assert!(machine.dispatch(GameAction::PlayCard { build_pile: 0 }).await);
        assert_eq!(machine.snapshot().players[0].hand_cards().count(), 5);
        let shown = recorder.shown().split_off(already_shown);
        let [Presentation::Draw { player: 0, motions }] = shown.as_slice() else {
            panic!("expected one refill draw, got {shown:?}");
        };
        let targets: Vec<CardLocation> = motions.iter().map(|motion| motion.to).collect();
        assert_eq!(targets, (0..5).map(CardLocation::Hand).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn bot_emptying_the_hand_presents_the_refill_after_the_play() {
        let recorder = Recorder::default();
        let config = GameConfig {
            hand_size: 1,
            ..GameConfig::default()
        };
        let bot = Script(vec![
            GameAction::SelectCard {
                source: CardSource::Hand(0),
            },
            GameAction::PlayCard { build_pile: 0 },
        ]);
        let mut machine = TurnMachine::new(config, recorder.clone(), bot, 22).unwrap();
        machine.start().await;
        machine.state.deck.push(Card::Number(1));
        assert!(machine.dispatch(GameAction::EndTurn).await);

        assert_eq!(machine.state.build_piles[0].len(), 1);
        assert_eq!(machine.state.players[1].hand_cards().count(), 1);
        let shown = recorder.shown();
        let bot_moves: Vec<&Presentation> = shown
            .iter()
            .filter(|presentation| match presentation {
                Presentation::Draw { player, .. }
                | Presentation::Play { player, .. }
                | Presentation::Discard { player, .. } => *player == 1,
                Presentation::Think { .. } => false,
            })
            .collect();
        assert!(matches!(
            bot_moves.as_slice(),
            [
                Presentation::Draw { .. },
                Presentation::Play { .. },
                Presentation::Draw { motions, .. },
            ] if motions.len() == 1
        ));
    }
}
