//! Scoring functions shared by the look-ahead ranking and the fallback chain.
//!
//! Every score is relative: larger is better, and only comparisons between
//! scores of the same kind are meaningful.

use crate::action::CardSource;
use crate::bots::difficulty::DifficultyProfile;
use crate::card::Card;
use crate::rules;
use crate::state::GameState;

/// Keep value given to Skip-Bo cards; nothing outranks them.
pub const SKIP_BO_KEEP: i32 = 1_000;

const BASE_PLAY: i32 = 1_000;

/// Values the build piles accept right now.
pub fn needed_values(state: &GameState) -> Vec<u8> {
    state
        .build_piles
        .iter()
        .filter_map(|pile| rules::accepted_value(pile, state.config.max_value))
        .collect()
}

/// How much the current player wants to hold on to `card`.
///
/// Low cards start and continue piles, so they are worth keeping; high cards are
/// the natural discards.
pub fn keep_value(state: &GameState, card: Card, profile: &DifficultyProfile) -> i32 {
    let Card::Number(value) = card else {
        return SKIP_BO_KEEP;
    };
    let max_value = state.config.max_value;
    let mut keep = if value <= 3 {
        60
    } else if value.saturating_add(4) <= max_value {
        30
    } else {
        10
    };

    let needed = needed_values(state);
    if needed.iter().any(|next| value == *next || value == next.saturating_add(1)) {
        keep += profile.needed_soon;
    }
    if let Some(Card::Number(stock)) = state.current().stock_top() {
        if needed.iter().any(|next| *next <= value && value < stock) {
            keep += profile.needed_soon;
        }
    }

    let copies = state
        .current()
        .hand_cards()
        .filter(|(_, held)| *held == card)
        .count() as i32;
    keep - profile.duplicate * (copies - 1).max(0)
}

/// How good a place discard pile `pile` is for a card of `value`.
pub fn discard_pile_score(
    state: &GameState,
    value: u8,
    pile: usize,
    profile: &DifficultyProfile,
) -> i32 {
    let Some(cards) = state.current().discard_piles.get(pile) else {
        return i32::MIN / 2;
    };
    let mut score = value as i32 * profile.high_value;
    match cards.last() {
        None => score += profile.empty_pile,
        Some(Card::Number(top)) if *top == value => score += profile.same_value,
        // Stacking downwards lets the pile be played back upwards later.
        Some(Card::Number(top)) if *top == value.saturating_add(1) => score += profile.sequential,
        Some(Card::Number(top)) if *top < value => {
            let weight = if *top <= 3 { 2 } else { 1 };
            score -= profile.buries_low * weight;
        }
        Some(_) => {}
    }
    if needed_values(state).contains(&value) {
        score -= profile.needed_value;
    }
    score - cards.len() as i32 * profile.pile_depth
}

/// Discard pile a card of `value` should go to.
pub fn best_discard_pile(state: &GameState, value: u8, profile: &DifficultyProfile) -> usize {
    let piles = &state.current().discard_piles;
    if !profile.strategic_discard {
        if let Some(empty) = piles.iter().position(Vec::is_empty) {
            return empty;
        }
        return piles
            .iter()
            .enumerate()
            .min_by_key(|(index, pile)| (pile.len(), *index))
            .map(|(index, _)| index)
            .unwrap_or(0);
    }
    let mut best = 0;
    let mut best_score = i32::MIN;
    for pile in 0..piles.len() {
        let score = discard_pile_score(state, value, pile, profile);
        if score > best_score {
            best = pile;
            best_score = score;
        }
    }
    best
}

/// Score for discarding the hand card `card` onto `pile`.
pub fn discard_move_score(
    state: &GameState,
    card: Card,
    pile: usize,
    profile: &DifficultyProfile,
) -> Option<i32> {
    let value = card.value()?;
    Some(discard_pile_score(state, value, pile, profile) - keep_value(state, card, profile))
}

/// True when playing `card` from `source` as `value` spends a Skip-Bo card
/// without completing a pile or freeing the stock top.
pub fn wastes_skip_bo(state: &GameState, source: CardSource, card: Card, value: u8) -> bool {
    card.is_skip_bo()
        && source != CardSource::Stock
        && value < state.config.max_value
        && !unlocks_stock(state, source, value)
}

fn unlocks_stock(state: &GameState, source: CardSource, value: u8) -> bool {
    source != CardSource::Stock
        && matches!(state.current().stock_top(), Some(Card::Number(stock)) if stock == value.saturating_add(1))
}

/// Score for playing `card` from `source` onto build pile `pile`.
pub fn play_score(
    state: &GameState,
    source: CardSource,
    card: Card,
    pile: usize,
    profile: &DifficultyProfile,
) -> Option<i32> {
    let value = rules::accepted_value(state.build_piles.get(pile)?, state.config.max_value)?;
    if !card.matches_value(value) {
        return None;
    }
    let mut score = BASE_PLAY;
    score += match source {
        CardSource::Stock => profile.stock_source,
        CardSource::Hand(_) => profile.hand_source,
        CardSource::Discard(index) => discard_source_score(state, index, profile),
    };
    let completes = value == state.config.max_value;
    if completes {
        score += profile.completion;
    }
    if unlocks_stock(state, source, value) {
        score += profile.unlocks_stock;
    }
    if card.is_skip_bo() && source != CardSource::Stock {
        if wastes_skip_bo(state, source, card, value) {
            score -= profile.skip_bo_waste;
        } else {
            score += profile.skip_bo_efficient;
        }
    }
    if !completes {
        if let Some(Card::Number(theirs)) = state.opponent().stock_top() {
            if theirs == value.saturating_add(1) {
                score -= profile.feeds_opponent;
            }
        }
    }
    Some(score)
}

/// Preference for playing off discard pile `index`: deeper piles free more cards.
pub fn discard_source_score(state: &GameState, index: usize, profile: &DifficultyProfile) -> i32 {
    let depth = state
        .current()
        .discard_piles
        .get(index)
        .map_or(0, Vec::len) as i32;
    profile.discard_source + depth * profile.discard_depth
}
