use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use skipbo::bot::Bot;
use skipbo::bots::{AiEngine, RandomBot, SeatedBots};
use skipbo::card::Card;
use skipbo::rules;
use skipbo::{BuildPile, CardSource, Difficulty, GameAction, GameConfig, GameState};

/// A reachable mid-game state reached by random legal play, with the current seat
/// handed to the AI and its hand refilled as it would be at the start of a turn.
fn random_state(rng: &mut StdRng) -> GameState {
    let config = GameConfig::default().with_stock_size(rng.gen_range(1..=30));
    let mut state = rules::apply(&GameState::empty(config), &GameAction::Init, rng).state;
    state = rules::apply(&state, &GameAction::Draw { count: None }, rng).state;
    let steps = rng.gen_range(0..300);
    for _ in 0..steps {
        let actions = rules::legal_actions(&state);
        let Some(action) = actions.choose(rng).cloned() else {
            break;
        };
        let seat = state.current_player;
        state = rules::apply(&state, &action, rng).state;
        if state.game_is_over {
            break;
        }
        if state.current_player != seat {
            state = rules::apply(&state, &GameAction::Draw { count: None }, rng).state;
        }
    }
    let seat = state.current_player;
    state.players[seat].is_ai = true;
    state
}

#[test]
fn ai_proposals_are_always_legal() {
    let mut rng = StdRng::seed_from_u64(0xA11E_6A1);
    let mut checked = 0;
    while checked < 1000 {
        let state = random_state(&mut rng);
        if state.game_is_over {
            continue;
        }
        checked += 1;
        for difficulty in Difficulty::ALL {
            let mut engine = AiEngine::new(checked as u64).with_difficulty(difficulty);
            let first = engine.decide(&state);
            assert_eq!(
                rules::check(&state, &first),
                Ok(()),
                "{difficulty} proposed {first:?}"
            );
            let next = rules::apply(&state, &first, &mut rng).state;
            if next.current_player != state.current_player || next.game_is_over {
                continue;
            }
            let second = engine.decide(&next);
            assert_eq!(
                rules::check(&next, &second),
                Ok(()),
                "{difficulty} followed {first:?} with {second:?}"
            );
            if let GameAction::DiscardCard { .. } = second {
                let selected = next.selected_card.map(|selection| selection.card);
                assert_ne!(selected, Some(Card::SkipBo));
            }
        }
    }
}

#[test]
fn ai_turns_always_end() {
    let mut rng = StdRng::seed_from_u64(99);
    for game in 0..30 {
        let state = random_state(&mut rng);
        if state.game_is_over {
            continue;
        }
        let seat = state.current_player;
        let mut engine = AiEngine::new(game);
        let mut current = state;
        let mut actions = 0;
        while current.current_player == seat && !current.game_is_over {
            let action = engine.decide(&current);
            let transition = rules::apply(&current, &action, &mut rng);
            assert!(transition.is_applied(), "illegal {action:?}");
            current = transition.state;
            actions += 1;
            assert!(actions < 500, "turn did not end");
        }
    }
}

#[test]
fn ai_ends_turn_when_nothing_can_move() {
    let mut state = GameState::empty(GameConfig::default());
    state.current_player = 1;
    state.players[1].stock = vec![Card::Number(9)];
    state.build_piles[0] = BuildPile::with_run(3);
    for difficulty in Difficulty::ALL {
        let mut engine = AiEngine::new(4).with_difficulty(difficulty);
        assert_eq!(engine.decide(&state), GameAction::EndTurn);
    }
}

#[test]
fn ai_takes_the_stock_card_first() {
    let mut state = GameState::empty(GameConfig::default());
    state.current_player = 1;
    state.players[1].stock = vec![Card::Number(4)];
    state.players[1].hand = vec![
        Some(Card::Number(4)),
        Some(Card::Number(1)),
        Some(Card::Number(10)),
        None,
        None,
    ];
    state.build_piles[2] = BuildPile::with_run(3);
    let mut engine = AiEngine::new(5).with_difficulty(Difficulty::Hard);
    assert_eq!(
        engine.decide(&state),
        GameAction::SelectCard {
            source: CardSource::Stock
        }
    );
    let mut engine = AiEngine::new(5).with_difficulty(Difficulty::Easy);
    let mut rng = StdRng::seed_from_u64(5);
    let select = engine.decide(&state);
    let selected = rules::apply(&state, &select, &mut rng).state;
    assert!(selected.selected_card.is_some());
}

#[test]
fn ai_discards_when_no_play_is_possible() {
    let mut state = GameState::empty(GameConfig::default());
    state.current_player = 1;
    state.players[1].stock = vec![Card::Number(12)];
    state.players[1].hand = vec![
        Some(Card::Number(2)),
        Some(Card::Number(11)),
        Some(Card::SkipBo),
        Some(Card::Number(3)),
        Some(Card::Number(2)),
    ];
    state.build_piles = vec![BuildPile::with_run(5); 4];
    let mut rng = StdRng::seed_from_u64(6);
    let mut engine = AiEngine::new(6).with_difficulty(Difficulty::Hard);
    let select = engine.decide(&state);
    let selected = rules::apply(&state, &select, &mut rng).state;
    let card = selected.selected_card.map(|selection| selection.card);
    assert_eq!(card, Some(Card::Number(11)));
    assert!(matches!(
        engine.decide(&selected),
        GameAction::DiscardCard { .. }
    ));
}

#[test]
fn seated_bots_follow_the_turn() {
    let mut state = GameState::empty(GameConfig::default());
    state.players[0].stock = vec![Card::Number(1)];
    state.players[1].stock = vec![Card::Number(9)];
    let mut bots = SeatedBots::new([
        Box::new(AiEngine::new(1)),
        Box::new(RandomBot::new(StdRng::seed_from_u64(1))),
    ]);
    assert_eq!(
        bots.decide(&state),
        GameAction::SelectCard {
            source: CardSource::Stock
        }
    );
    state.current_player = 1;
    let action = bots.decide(&state);
    assert_eq!(rules::check(&state, &action), Ok(()));
}
