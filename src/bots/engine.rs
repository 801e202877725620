use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use crate::action::{CardSource, Difficulty, GameAction, Selection};
use crate::bot::Bot;
use crate::bots::difficulty::DifficultyProfile;
use crate::bots::{Move, Step, heuristics, lookahead};
use crate::card::Card;
use crate::rules;
use crate::state::GameState;

/// The computer opponent.
///
/// Each decision yields one action. A move takes two decisions: the engine first
/// selects the card and remembers where it meant to put it, then plays or discards it.
///
/// Decision order:
/// 1. A card is already selected: play it on the planned (or first accepting) build
///    pile, else discard it if it came from the hand, else clear the selection.
/// 2. With look-ahead enabled, rank every legal play and discard and take the best.
///    A Skip-Bo card from the hand or a discard pile that neither completes a pile
///    nor frees the stock top ranks below every discard, so Medium and Hard hold it.
/// 3. Otherwise walk the fixed chain: stock top, hand cards from low to high with
///    Skip-Bo cards last, discard pile tops (deepest pile first), then discard the
///    hand card least worth keeping. Easy has no look-ahead and plays any Skip-Bo
///    card this chain reaches.
/// 4. Nothing possible: end the turn.
///
/// Lower difficulties sometimes pick one of the three best candidates at random; the
/// randomness comes from the injected `R`.
pub struct AiEngine<R = StdRng> {
    rng: R,
    plan: Option<Plan>,
    difficulty: Option<Difficulty>,
}

#[derive(Copy, Clone, Debug)]
struct Plan {
    selection: Selection,
    step: Step,
}

impl AiEngine<StdRng> {
    pub fn new(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> AiEngine<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            plan: None,
            difficulty: None,
        }
    }

    /// Ignore the difficulty stored in the game state and always play at `difficulty`.
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    fn profile(&self, state: &GameState) -> DifficultyProfile {
        DifficultyProfile::for_level(self.difficulty.unwrap_or(state.ai_difficulty))
    }

    /// The move the engine would start next, ignoring any current selection.
    pub fn choose_move(&mut self, state: &GameState) -> Option<Move> {
        let profile = self.profile(state);
        let ranked: Vec<Move> = if profile.lookahead {
            lookahead::ranked_moves(state, &profile)
                .into_iter()
                .map(|scored| scored.mv)
                .collect()
        } else {
            priority_moves(state, &profile)
        };
        let best = *ranked.first()?;
        if profile.blunder_chance > 0.0 && self.rng.gen_bool(profile.blunder_chance) {
            let pool: Vec<Move> = ranked
                .iter()
                .filter(|mv| mv.step.is_play() == best.step.is_play())
                .take(3)
                .copied()
                .collect();
            let pick = pool[self.rng.gen_range(0..pool.len())];
            trace!(?pick, ?best, "picking a sub-optimal move");
            return Some(pick);
        }
        Some(best)
    }

    fn resolve_selection(
        &self,
        state: &GameState,
        selection: Selection,
        plan: Option<Plan>,
        profile: &DifficultyProfile,
    ) -> GameAction {
        if let Some(plan) = plan {
            let action = plan.step.action();
            if rules::check(state, &action).is_ok() {
                return action;
            }
        }
        if let Some(build_pile) = rules::first_accepting_pile(state, selection.card) {
            let action = GameAction::PlayCard { build_pile };
            if rules::check(state, &action).is_ok() {
                return action;
            }
        }
        if let (CardSource::Hand(_), Card::Number(value)) = (selection.source, selection.card) {
            let action = GameAction::DiscardCard {
                discard_pile: heuristics::best_discard_pile(state, value, profile),
            };
            if rules::check(state, &action).is_ok() {
                return action;
            }
        }
        GameAction::ClearSelection
    }
}

impl<R: Rng + Send> Bot for AiEngine<R> {
    fn decide(&mut self, state: &GameState) -> GameAction {
        if state.game_is_over {
            return GameAction::EndTurn;
        }
        if let Some(selection) = state.selected_card {
            let plan = self.plan.take().filter(|plan| plan.selection == selection);
            let profile = self.profile(state);
            return self.resolve_selection(state, selection, plan, &profile);
        }
        self.plan = None;
        match self.choose_move(state) {
            Some(mv) => {
                self.plan = Some(Plan {
                    selection: Selection {
                        card: mv.card,
                        source: mv.source,
                    },
                    step: mv.step,
                });
                GameAction::SelectCard { source: mv.source }
            }
            None => {
                debug!(player = state.current_player, "no move available, ending turn");
                GameAction::EndTurn
            }
        }
    }
}

/// Candidate moves in fixed priority order.
pub fn priority_moves(state: &GameState, profile: &DifficultyProfile) -> Vec<Move> {
    let player = state.current();
    let mut moves = Vec::new();
    let push_play = |moves: &mut Vec<Move>, source: CardSource, card: Card| {
        if let Some(pile) = rules::first_accepting_pile(state, card) {
            moves.push(Move {
                source,
                card,
                step: Step::Play(pile),
            });
        }
    };

    if let Some(card) = player.stock_top() {
        push_play(&mut moves, CardSource::Stock, card);
    }

    let mut hand: Vec<(usize, Card)> = player.hand_cards().collect();
    hand.sort_by_key(|(slot, card)| (card.value().unwrap_or(u8::MAX), *slot));
    for (slot, card) in hand.iter().copied() {
        push_play(&mut moves, CardSource::Hand(slot), card);
    }

    let mut discards: Vec<(usize, Card)> = (0..player.discard_piles.len())
        .filter_map(|index| player.discard_top(index).map(|card| (index, card)))
        .collect();
    discards.sort_by_key(|(index, _)| {
        (
            -heuristics::discard_source_score(state, *index, profile),
            *index,
        )
    });
    for (index, card) in discards {
        push_play(&mut moves, CardSource::Discard(index), card);
    }

    let mut throwaways: Vec<(usize, Card, i32)> = hand
        .iter()
        .filter(|(_, card)| !card.is_skip_bo())
        .map(|(slot, card)| (*slot, *card, heuristics::keep_value(state, *card, profile)))
        .collect();
    throwaways.sort_by_key(|(slot, card, keep)| (*keep, u8::MAX - card.value().unwrap_or(0), *slot));
    for (slot, card, _) in throwaways {
        let Some(value) = card.value() else {
            continue;
        };
        moves.push(Move {
            source: CardSource::Hand(slot),
            card,
            step: Step::Discard(heuristics::best_discard_pile(state, value, profile)),
        });
    }
    moves
}

#[cfg(test)]
mod tests {
    use rand::rngs::mock::StepRng;

    use super::*;
    use crate::config::GameConfig;
    use crate::state::BuildPile;

    fn ai_state() -> GameState {
        let mut state = GameState::empty(GameConfig::default());
        state.current_player = 1;
        state.players[1].stock = vec![Card::Number(12)];
        state
    }

    #[test]
    fn fallback_plays_stock_before_hand() {
        let mut state = ai_state();
        state.players[1].stock = vec![Card::Number(1)];
        state.players[1].hand[0] = Some(Card::Number(1));
        let moves = priority_moves(&state, &DifficultyProfile::EASY);
        assert_eq!(moves[0].source, CardSource::Stock);
    }

    #[test]
    fn fallback_orders_hand_ascending_with_skip_bo_last() {
        let mut state = ai_state();
        state.build_piles[1] = BuildPile::with_run(1);
        state.players[1].hand = vec![
            Some(Card::SkipBo),
            Some(Card::Number(2)),
            Some(Card::Number(1)),
            None,
            Some(Card::Number(9)),
        ];
        let moves = priority_moves(&state, &DifficultyProfile::EASY);
        let sources: Vec<CardSource> = moves
            .iter()
            .filter(|mv| mv.step.is_play())
            .map(|mv| mv.source)
            .collect();
        assert_eq!(
            sources,
            vec![CardSource::Hand(2), CardSource::Hand(1), CardSource::Hand(0)]
        );
    }

    #[test]
    fn fallback_prefers_deeper_discard_pile() {
        let mut state = ai_state();
        state.players[1].discard_piles[0] = vec![Card::Number(1)];
        state.players[1].discard_piles[2] = vec![Card::Number(8), Card::Number(1)];
        let moves = priority_moves(&state, &DifficultyProfile::EASY);
        assert_eq!(moves[0].source, CardSource::Discard(2));
    }

    #[test]
    fn plays_planned_pile_after_selecting() {
        let mut state = ai_state();
        state.players[1].stock = vec![Card::SkipBo];
        state.build_piles[3] = BuildPile::with_run(11);
        let mut engine = AiEngine::new(7).with_difficulty(Difficulty::Hard);
        let select = engine.decide(&state);
        assert_eq!(
            select,
            GameAction::SelectCard {
                source: CardSource::Stock
            }
        );
        state.selected_card = Some(Selection {
            card: Card::SkipBo,
            source: CardSource::Stock,
        });
        assert_eq!(engine.decide(&state), GameAction::PlayCard { build_pile: 3 });
    }

    #[test]
    fn unplanned_selection_goes_to_first_accepting_pile() {
        let mut state = ai_state();
        state.players[1].hand[0] = Some(Card::SkipBo);
        state.selected_card = Some(Selection {
            card: Card::SkipBo,
            source: CardSource::Hand(0),
        });
        let mut engine = AiEngine::new(1);
        assert_eq!(engine.decide(&state), GameAction::PlayCard { build_pile: 0 });
    }

    #[test]
    fn unplayable_stock_selection_is_cleared() {
        let mut state = ai_state();
        state.selected_card = Some(Selection {
            card: Card::Number(12),
            source: CardSource::Stock,
        });
        let mut engine = AiEngine::new(1);
        assert_eq!(engine.decide(&state), GameAction::ClearSelection);
    }

    #[test]
    fn ends_turn_with_nothing_to_do() {
        let state = ai_state();
        let mut engine = AiEngine::new(3);
        assert_eq!(engine.decide(&state), GameAction::EndTurn);
    }

    #[test]
    fn forced_blunder_stays_within_top_three() {
        let mut state = ai_state();
        state.ai_difficulty = Difficulty::Easy;
        state.players[1].hand = vec![
            Some(Card::Number(1)),
            Some(Card::Number(1)),
            Some(Card::Number(1)),
            Some(Card::Number(1)),
            Some(Card::Number(1)),
        ];
        // A zero-valued mock makes every chance roll succeed and every range pick the low end.
        let mut engine = AiEngine::with_rng(StepRng::new(0, 0));
        let mv = engine.choose_move(&state).expect("a move");
        assert_eq!(mv.source, CardSource::Hand(0));
        assert!(mv.step.is_play());
    }
}
