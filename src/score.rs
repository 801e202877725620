//! Scoring for finished games.
//!
//! Only the winner scores:
//!   points = 25 (base win) + 5 * (cards left in the opponents' stock piles)
//! Unfinished or stalled games award nothing.

use crate::state::GameState;

pub const WIN_POINTS: usize = 25;
pub const POINTS_PER_STOCK_CARD: usize = 5;

/// Points earned by the winner, or `None` while nobody has won.
pub fn winner_points(state: &GameState) -> Option<usize> {
    let winner = state.winner.filter(|_| state.game_is_over)?;
    let opponents_stock: usize = state
        .players
        .iter()
        .enumerate()
        .filter(|(seat, _)| *seat != winner)
        .map(|(_, player)| player.stock.len())
        .sum();
    Some(WIN_POINTS + POINTS_PER_STOCK_CARD * opponents_stock)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Card;
    use crate::config::GameConfig;

    fn finished(winner: usize, loser_stock: usize) -> GameState {
        let mut state = GameState::empty(GameConfig::default());
        state.players[1 - winner].stock = vec![Card::Number(4); loser_stock];
        state.game_is_over = true;
        state.winner = Some(winner);
        state
    }

    #[test]
    fn test_winner_points_counts_opponent_stock() {
        assert_eq!(winner_points(&finished(0, 7)), Some(60));
        assert_eq!(winner_points(&finished(1, 13)), Some(90));
    }

    #[test]
    fn test_winner_points_base_only() {
        assert_eq!(winner_points(&finished(1, 0)), Some(25));
    }

    #[test]
    fn test_no_points_while_running() {
        let state = GameState::empty(GameConfig::default());
        assert_eq!(winner_points(&state), None);
    }
}
