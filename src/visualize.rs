use std::fmt::Write;

use crate::action::{CardSource, GameAction};
use crate::card::{Card, PlayedCard};
use crate::state::GameState;

/// Customize state rendering for CLI visualization.
#[derive(Clone, Copy, Debug)]
pub struct VisualOptions {
    pub show_build_sequences: bool,
    pub show_discard_sizes: bool,
    /// Print every hand, not just the human seats'.
    pub reveal_ai_hands: bool,
}

impl Default for VisualOptions {
    fn default() -> Self {
        Self {
            show_build_sequences: true,
            show_discard_sizes: true,
            reveal_ai_hands: true,
        }
    }
}

pub fn render_state(state: &GameState) -> String {
    render_state_with_options(state, VisualOptions::default())
}

pub fn render_state_with_options(state: &GameState, options: VisualOptions) -> String {
    let mut out = String::new();
    let status = match (state.game_is_over, state.winner) {
        (true, Some(winner)) => format!("Finished (winner: {})", seat_label(state, winner)),
        (true, None) => String::from("Finished"),
        (false, _) => String::from("Ongoing"),
    };
    let _ = writeln!(out, "Game status: {status}");
    let _ = writeln!(out, "Difficulty: {}", state.ai_difficulty);
    let _ = writeln!(out, "Current: {}", seat_label(state, state.current_player));
    let _ = writeln!(
        out,
        "Deck: {}  |  Completed: {}",
        state.deck.len(),
        state.completed_build_piles.len()
    );
    let _ = writeln!(out, "Build piles:");
    for (idx, pile) in state.build_piles.iter().enumerate() {
        let sequence = if options.show_build_sequences && !pile.is_empty() {
            let seq = pile
                .cards()
                .iter()
                .map(format_played)
                .collect::<Vec<_>>()
                .join(" ");
            format!("[{seq}]")
        } else {
            String::from("[-]")
        };
        let _ = writeln!(out, "  [{idx}] next {}  {}", pile.next_value(), sequence);
    }
    let _ = writeln!(out, "Players:");
    for (seat, player) in state.players.iter().enumerate() {
        let current_tag = if seat == state.current_player {
            " <- current"
        } else {
            ""
        };
        let stock_top = player
            .stock_top()
            .map(format_card)
            .unwrap_or_else(|| String::from("--"));
        let discard_display = player
            .discard_piles
            .iter()
            .enumerate()
            .map(|(idx, pile)| {
                let top = pile
                    .last()
                    .map(|card| format_card(*card))
                    .unwrap_or_else(|| String::from("--"));
                if options.show_discard_sizes {
                    format!("{idx}:{top} ({})", pile.len())
                } else {
                    format!("{idx}:{top}")
                }
            })
            .collect::<Vec<_>>()
            .join("  ");
        let _ = writeln!(
            out,
            "  {} - stock {} (top: {}){}",
            seat_label(state, seat),
            player.stock.len(),
            stock_top,
            current_tag
        );
        let _ = writeln!(out, "    Discards: {discard_display}");
        if options.reveal_ai_hands || !player.is_ai {
            let hand_display = player
                .hand
                .iter()
                .enumerate()
                .map(|(idx, slot)| {
                    let card = slot.map(format_card).unwrap_or_else(|| String::from("__"));
                    format!("{idx}:{card}")
                })
                .collect::<Vec<_>>()
                .join("  ");
            let _ = writeln!(out, "    Hand: {hand_display}");
        } else {
            let _ = writeln!(out, "    Hand size: {}", player.hand_cards().count());
        }
    }
    if let Some(selection) = state.selected_card {
        let _ = writeln!(
            out,
            "Selected: {} from {}",
            format_card(selection.card),
            describe_source(selection.source)
        );
    }
    if !state.message.is_empty() {
        let _ = writeln!(out, "Message: {}", state.message);
    }
    out
}

/// One-line description of `action` as taken by the current player of `state`.
pub fn describe_action(state: &GameState, action: &GameAction) -> String {
    let player = state.current();
    match action {
        GameAction::Init => String::from("Deal a new game"),
        GameAction::Reset => String::from("Reset the game"),
        GameAction::Draw { count: Some(count) } => format!("Draw up to {count} cards"),
        GameAction::Draw { count: None } => String::from("Draw to a full hand"),
        GameAction::SelectCard { source } => {
            let card = player
                .card_at(*source)
                .map(format_card)
                .unwrap_or_else(|| String::from("--"));
            format!("Select {} {card}", describe_source(*source))
        }
        GameAction::ClearSelection => String::from("Clear selection"),
        GameAction::PlayCard { build_pile } => {
            let card = state
                .selected_card
                .map(|selection| format_card(selection.card))
                .unwrap_or_else(|| String::from("--"));
            match state.build_piles.get(*build_pile) {
                Some(pile) => format!(
                    "Play {card} to build pile {build_pile} (needs {})",
                    pile.next_value()
                ),
                None => format!("Play {card} to build pile {build_pile}"),
            }
        }
        GameAction::DiscardCard { discard_pile } => {
            let card = state
                .selected_card
                .map(|selection| format_card(selection.card))
                .unwrap_or_else(|| String::from("--"));
            format!("Discard {card} to pile {discard_pile}")
        }
        GameAction::EndTurn => String::from("End turn"),
        GameAction::SetDifficulty { difficulty } => format!("Set difficulty to {difficulty}"),
    }
}

fn seat_label(state: &GameState, seat: usize) -> String {
    if state.players[seat].is_ai {
        format!("Player {seat} (AI)")
    } else {
        format!("Player {seat}")
    }
}

fn describe_source(source: CardSource) -> String {
    match source {
        CardSource::Hand(index) => format!("hand[{index}]"),
        CardSource::Stock => String::from("stock top"),
        CardSource::Discard(index) => format!("discard[{index}]"),
    }
}

fn format_card(card: Card) -> String {
    match card {
        Card::Number(value) => value.to_string(),
        Card::SkipBo => String::from("SB"),
    }
}

fn format_played(card: &PlayedCard) -> String {
    if card.wild {
        format!("SB({})", card.value)
    } else {
        card.value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::action::Selection;
    use crate::config::GameConfig;
    use crate::rules;

    #[test]
    fn render_and_describe_include_expected_phrases() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut state =
            rules::apply(&GameState::empty(GameConfig::default()), &GameAction::Init, &mut rng).state;
        state.players[0].hand[0] = Some(Card::SkipBo);
        state.selected_card = Some(Selection {
            card: Card::SkipBo,
            source: CardSource::Hand(0),
        });
        let text = render_state(&state);
        assert!(text.contains("Player 1 (AI)"));
        assert!(text.contains("Hand: 0:SB"));
        assert!(text.contains("Selected: SB from hand[0]"));

        let play = describe_action(&state, &GameAction::PlayCard { build_pile: 2 });
        assert_eq!(play, "Play SB to build pile 2 (needs 1)");
        let discard = describe_action(&state, &GameAction::DiscardCard { discard_pile: 0 });
        assert!(discard.starts_with("Discard"));
    }

    #[test]
    fn hidden_ai_hands_show_only_their_size() {
        let state = GameState::empty(GameConfig::default());
        let options = VisualOptions {
            reveal_ai_hands: false,
            ..VisualOptions::default()
        };
        let text = render_state_with_options(&state, options);
        assert!(text.contains("Hand size: 0"));
        assert!(text.contains("Hand: 0:__"));
    }
}
