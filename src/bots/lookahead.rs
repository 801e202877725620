use tracing::trace;

use crate::action::CardSource;
use crate::bots::difficulty::DifficultyProfile;
use crate::bots::heuristics;
use crate::bots::{Move, Step};
use crate::card::Card;
use crate::rules;
use crate::state::GameState;

/// Coarse ordering applied before scores: a useful play always beats a discard,
/// and a discard beats throwing a Skip-Bo card away.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub enum MoveClass {
    WastedPlay,
    Discard,
    Play,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ScoredMove {
    pub mv: Move,
    pub class: MoveClass,
    pub score: i32,
}

/// Every legal play and discard for the current player, best first.
///
/// Equal moves keep enumeration order: stock, then hand slots, then discard piles.
pub fn ranked_moves(state: &GameState, profile: &DifficultyProfile) -> Vec<ScoredMove> {
    let player = state.current();
    let mut moves = Vec::new();

    let mut sources: Vec<(CardSource, Card)> = Vec::new();
    if let Some(card) = player.stock_top() {
        sources.push((CardSource::Stock, card));
    }
    sources.extend(
        player
            .hand_cards()
            .map(|(slot, card)| (CardSource::Hand(slot), card)),
    );
    sources.extend(
        (0..player.discard_piles.len())
            .filter_map(|index| player.discard_top(index).map(|card| (CardSource::Discard(index), card))),
    );

    for (source, card) in sources.iter().copied() {
        for pile in 0..state.build_piles.len() {
            let Some(score) = heuristics::play_score(state, source, card, pile, profile) else {
                continue;
            };
            let value = state.build_piles[pile].next_value();
            let class = if heuristics::wastes_skip_bo(state, source, card, value) {
                MoveClass::WastedPlay
            } else {
                MoveClass::Play
            };
            moves.push(ScoredMove {
                mv: Move {
                    source,
                    card,
                    step: Step::Play(pile),
                },
                class,
                score,
            });
        }
    }

    for (slot, card) in player.hand_cards() {
        let Some(value) = card.value() else {
            continue;
        };
        let piles: Vec<usize> = if profile.strategic_discard {
            (0..player.discard_piles.len()).collect()
        } else {
            vec![heuristics::best_discard_pile(state, value, profile)]
        };
        for pile in piles {
            let Some(score) = heuristics::discard_move_score(state, card, pile, profile) else {
                continue;
            };
            moves.push(ScoredMove {
                mv: Move {
                    source: CardSource::Hand(slot),
                    card,
                    step: Step::Discard(pile),
                },
                class: MoveClass::Discard,
                score,
            });
        }
    }

    moves.sort_by(|a, b| (b.class, b.score).cmp(&(a.class, a.score)));
    debug_assert!(moves.iter().all(|scored| is_legal(state, &scored.mv)));
    if let Some(best) = moves.first() {
        trace!(candidates = moves.len(), best = ?best.mv, score = best.score, "ranked moves");
    }
    moves
}

fn is_legal(state: &GameState, mv: &Move) -> bool {
    match mv.step {
        Step::Play(pile) => state
            .build_piles
            .get(pile)
            .is_some_and(|pile| rules::can_play(mv.card, pile, state.config.max_value)),
        Step::Discard(_) => matches!(mv.source, CardSource::Hand(_)) && !mv.card.is_skip_bo(),
    }
}
