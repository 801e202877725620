//! The rules engine: a pure reducer from `(state, action)` to the next state.
//!
//! `apply` never mutates its input. Illegal actions come back as the unchanged
//! state carrying an explanatory message; they never panic.

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, trace};

use crate::action::{CardSource, GameAction, PlayerId, Selection};
use crate::card::{Card, PLAYER_COUNT, PlayedCard, build_deck};
use crate::error::IllegalAction;
use crate::state::{BuildPile, GameState, PlayerState};

/// Result of feeding one action to the reducer.
#[derive(Clone, Debug)]
pub struct Transition {
    pub state: GameState,
    pub outcome: Result<(), IllegalAction>,
}

impl Transition {
    pub fn is_applied(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Value `pile` accepts next, or `None` once it holds `max_value` cards.
pub fn accepted_value(pile: &BuildPile, max_value: u8) -> Option<u8> {
    let next = pile.next_value();
    (next <= max_value).then_some(next)
}

/// Whether `card` may be played on `pile`.
pub fn can_play(card: Card, pile: &BuildPile, max_value: u8) -> bool {
    accepted_value(pile, max_value).is_some_and(|value| card.matches_value(value))
}

/// Index of the first build pile accepting `card`.
pub fn first_accepting_pile(state: &GameState, card: Card) -> Option<usize> {
    state
        .build_piles
        .iter()
        .position(|pile| can_play(card, pile, state.config.max_value))
}

/// Validates `action` against `state` without changing anything.
pub fn check(state: &GameState, action: &GameAction) -> Result<(), IllegalAction> {
    match action {
        GameAction::Init
        | GameAction::Reset
        | GameAction::ClearSelection
        | GameAction::EndTurn
        | GameAction::SetDifficulty { .. } => Ok(()),
        GameAction::Draw { .. } => ensure_running(state),
        GameAction::SelectCard { source } => {
            ensure_running(state)?;
            peek_source(state.current(), *source).map(|_| ())
        }
        GameAction::PlayCard { build_pile } => {
            ensure_running(state)?;
            let selection = live_selection(state)?;
            play_target(state, selection.card, *build_pile).map(|_| ())
        }
        GameAction::DiscardCard { discard_pile } => {
            ensure_running(state)?;
            let selection = live_selection(state)?;
            check_discard(state, &selection, *discard_pile)
        }
    }
}

/// Applies `action` to a copy of `state`.
///
/// `rng` drives shuffling (new games and reshuffling completed piles into the deck).
pub fn apply<R: Rng + ?Sized>(state: &GameState, action: &GameAction, rng: &mut R) -> Transition {
    if let Err(reason) = check(state, action) {
        debug!(?action, %reason, "action rejected");
        let mut rejected = state.clone();
        rejected.message = reason.to_string();
        return Transition {
            state: rejected,
            outcome: Err(reason),
        };
    }

    let mut next = state.clone();
    match action {
        GameAction::Init => {
            deal(&mut next, rng);
            next.message = format!("New game started. {} goes first.", seat_name(&next, 0));
        }
        GameAction::Reset => {
            deal(&mut next, rng);
            next.message = format!("Game reset. {} goes first.", seat_name(&next, 0));
        }
        GameAction::Draw { count } => {
            let drawn = draw_into_hand(&mut next, *count, rng);
            trace!(player = next.current_player, drawn, "drew cards");
        }
        GameAction::SelectCard { source } => {
            if let Ok(card) = peek_source(next.current(), *source) {
                next.selected_card = Some(Selection {
                    card,
                    source: *source,
                });
                next.message = format!("Selected {}.", card_name(card));
            }
        }
        GameAction::ClearSelection => {
            next.selected_card = None;
        }
        GameAction::PlayCard { build_pile } => play_selected(&mut next, *build_pile, rng),
        GameAction::DiscardCard { discard_pile } => discard_selected(&mut next, *discard_pile),
        GameAction::EndTurn => {
            let ended = next.current_player;
            switch_turn(&mut next);
            next.message = format!(
                "{} ended their turn. {}'s turn.",
                seat_name(&next, ended),
                seat_name(&next, next.current_player)
            );
        }
        GameAction::SetDifficulty { difficulty } => {
            next.ai_difficulty = *difficulty;
            next.message = format!("AI difficulty set to {difficulty}.");
        }
    }
    debug_assert!(
        state.check_invariants().is_err() || next.check_invariants().is_ok(),
        "{action:?} broke an invariant: {:?}",
        next.check_invariants()
    );
    debug!(?action, player = state.current_player, "action applied");
    Transition {
        state: next,
        outcome: Ok(()),
    }
}

/// Every turn action the current player could legally take right now.
///
/// Restart, difficulty and draw actions are not included.
pub fn legal_actions(state: &GameState) -> Vec<GameAction> {
    let mut actions = Vec::new();
    if state.game_is_over {
        return actions;
    }
    let player = state.current();
    let mut sources = vec![CardSource::Stock];
    sources.extend((0..player.hand.len()).map(CardSource::Hand));
    sources.extend((0..player.discard_piles.len()).map(CardSource::Discard));
    for source in sources {
        if player.card_at(source).is_some() {
            actions.push(GameAction::SelectCard { source });
        }
    }
    if state.selected_card.is_some() {
        actions.push(GameAction::ClearSelection);
        for build_pile in 0..state.build_piles.len() {
            let action = GameAction::PlayCard { build_pile };
            if check(state, &action).is_ok() {
                actions.push(action);
            }
        }
        for discard_pile in 0..player.discard_piles.len() {
            let action = GameAction::DiscardCard { discard_pile };
            if check(state, &action).is_ok() {
                actions.push(action);
            }
        }
    }
    actions.push(GameAction::EndTurn);
    actions
}

fn ensure_running(state: &GameState) -> Result<(), IllegalAction> {
    if state.game_is_over {
        Err(IllegalAction::GameOver)
    } else {
        Ok(())
    }
}

fn peek_source(player: &PlayerState, source: CardSource) -> Result<Card, IllegalAction> {
    match source {
        CardSource::Hand(slot) => match player.hand.get(slot) {
            None => Err(IllegalAction::HandIndex(slot)),
            Some(None) => Err(IllegalAction::EmptyHandSlot(slot)),
            Some(Some(card)) => Ok(*card),
        },
        CardSource::Stock => player.stock_top().ok_or(IllegalAction::EmptyStock),
        CardSource::Discard(index) => match player.discard_piles.get(index) {
            None => Err(IllegalAction::DiscardIndex(index)),
            Some(pile) => pile.last().copied().ok_or(IllegalAction::EmptyDiscard(index)),
        },
    }
}

/// The current selection, provided its source still holds the selected card.
fn live_selection(state: &GameState) -> Result<Selection, IllegalAction> {
    let selection = state.selected_card.ok_or(IllegalAction::NothingSelected)?;
    match peek_source(state.current(), selection.source) {
        Ok(card) if card == selection.card => Ok(selection),
        _ => Err(IllegalAction::StaleSelection),
    }
}

/// Value `card` would take on `build_pile`.
fn play_target(state: &GameState, card: Card, build_pile: usize) -> Result<u8, IllegalAction> {
    let pile = state
        .build_piles
        .get(build_pile)
        .ok_or(IllegalAction::BuildPileIndex(build_pile))?;
    let required =
        accepted_value(pile, state.config.max_value).ok_or(IllegalAction::PileFull(build_pile))?;
    if card.matches_value(required) {
        Ok(required)
    } else {
        Err(IllegalAction::CardMismatch {
            pile: build_pile,
            required,
        })
    }
}

fn check_discard(
    state: &GameState,
    selection: &Selection,
    discard_pile: usize,
) -> Result<(), IllegalAction> {
    if !matches!(selection.source, CardSource::Hand(_)) {
        return Err(IllegalAction::NotFromHand);
    }
    if selection.card.is_skip_bo() {
        return Err(IllegalAction::SkipBoDiscard);
    }
    if discard_pile >= state.current().discard_piles.len() {
        return Err(IllegalAction::DiscardIndex(discard_pile));
    }
    Ok(())
}

fn deal<R: Rng + ?Sized>(state: &mut GameState, rng: &mut R) {
    let config = state.config;
    let difficulty = state.ai_difficulty;
    let mut fresh = GameState::empty(config);
    fresh.ai_difficulty = difficulty;
    let mut deck = build_deck(&config);
    deck.shuffle(rng);
    for player in fresh.players.iter_mut() {
        let split = deck.len().saturating_sub(config.stock_size);
        player.stock = deck.split_off(split);
    }
    fresh.deck = deck;
    *state = fresh;
}

/// Fills empty hand slots of the current player, lowest slot first.
fn draw_into_hand<R: Rng + ?Sized>(state: &mut GameState, count: Option<usize>, rng: &mut R) -> usize {
    let empty = state.current().empty_slots();
    let wanted = count.map_or(empty.len(), |count| count.min(empty.len()));
    if wanted == 0 {
        return 0;
    }
    if state.deck.len() < wanted && !state.completed_build_piles.is_empty() {
        recycle_completed(state, rng);
    }
    let mut drawn = 0;
    for slot in empty.into_iter().take(wanted) {
        let Some(card) = state.deck.pop() else {
            break;
        };
        state.current_mut().hand[slot] = Some(card);
        drawn += 1;
    }
    drawn
}

/// Shuffles the completed piles and slides them beneath the remaining deck.
fn recycle_completed<R: Rng + ?Sized>(state: &mut GameState, rng: &mut R) {
    let mut recycled = std::mem::take(&mut state.completed_build_piles);
    recycled.shuffle(rng);
    debug!(cards = recycled.len(), "reshuffling completed build piles into the deck");
    recycled.append(&mut state.deck);
    state.deck = recycled;
}

fn take_from_source(player: &mut PlayerState, source: CardSource) -> Option<Card> {
    match source {
        CardSource::Hand(slot) => player.hand.get_mut(slot).and_then(Option::take),
        CardSource::Stock => player.stock.pop(),
        CardSource::Discard(index) => player.discard_piles.get_mut(index).and_then(Vec::pop),
    }
}

fn play_selected<R: Rng + ?Sized>(state: &mut GameState, build_pile: usize, rng: &mut R) {
    let Some(selection) = state.selected_card.take() else {
        return;
    };
    let Ok(value) = play_target(state, selection.card, build_pile) else {
        return;
    };
    let mover = state.current_player;
    if take_from_source(state.current_mut(), selection.source).is_none() {
        return;
    }
    let max_value = state.config.max_value;
    let mut message = format!(
        "{} played {} on build pile {}.",
        seat_name(state, mover),
        played_name(selection.card, value),
        build_pile + 1
    );
    let pile = &mut state.build_piles[build_pile];
    pile.push(PlayedCard::new(selection.card, value));
    if pile.len() == max_value as usize {
        let completed = pile.take_cards();
        debug!(build_pile, "build pile completed");
        state.completed_build_piles.extend(completed);
        message.push_str(&format!(" Build pile {} is complete!", build_pile + 1));
    }
    state.message = message;

    if state.current().stock.is_empty() {
        state.game_is_over = true;
        state.winner = Some(mover);
        state.message = format!("{} wins the game!", seat_name(state, mover));
        return;
    }

    if matches!(selection.source, CardSource::Hand(_)) && state.current().hand_is_empty() {
        let drawn = draw_into_hand(state, None, rng);
        if drawn > 0 {
            state.message.push_str(&format!(" Hand emptied, drew {drawn} cards."));
        }
    }
}

fn discard_selected(state: &mut GameState, discard_pile: usize) {
    let Some(selection) = state.selected_card.take() else {
        return;
    };
    let mover = state.current_player;
    let Some(card) = take_from_source(state.current_mut(), selection.source) else {
        return;
    };
    state.current_mut().discard_piles[discard_pile].push(card);
    switch_turn(state);
    state.message = format!(
        "{} discarded {} to discard pile {}. {}'s turn.",
        seat_name(state, mover),
        card_name(card),
        discard_pile + 1,
        seat_name(state, state.current_player)
    );
}

fn switch_turn(state: &mut GameState) {
    state.current_player = (state.current_player + 1) % PLAYER_COUNT;
    state.selected_card = None;
}

fn seat_name(state: &GameState, player: PlayerId) -> String {
    if state.players[player].is_ai {
        format!("Computer (player {})", player + 1)
    } else {
        format!("Player {}", player + 1)
    }
}

pub(crate) fn card_name(card: Card) -> String {
    match card {
        Card::Number(value) => value.to_string(),
        Card::SkipBo => String::from("Skip-Bo"),
    }
}

fn played_name(card: Card, value: u8) -> String {
    match card {
        Card::Number(_) => value.to_string(),
        Card::SkipBo => format!("Skip-Bo as {value}"),
    }
}
