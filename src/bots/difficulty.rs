use crate::action::Difficulty;

/// Weight table and feature switches for one difficulty level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DifficultyProfile {
    /// Rank every legal move instead of walking the fixed priority chain.
    pub lookahead: bool,
    /// Score discard piles; otherwise take the first empty (or shallowest) pile.
    pub strategic_discard: bool,
    /// Probability of picking among the top three candidates instead of the best.
    pub blunder_chance: f64,

    // Play scoring.
    pub stock_source: i32,
    pub discard_source: i32,
    pub discard_depth: i32,
    pub hand_source: i32,
    pub completion: i32,
    pub unlocks_stock: i32,
    pub skip_bo_efficient: i32,
    pub skip_bo_waste: i32,
    pub feeds_opponent: i32,

    // Discard pile scoring.
    pub empty_pile: i32,
    pub same_value: i32,
    pub sequential: i32,
    pub high_value: i32,
    pub buries_low: i32,
    pub needed_value: i32,
    pub pile_depth: i32,

    // Keep value adjustments.
    pub duplicate: i32,
    pub needed_soon: i32,
}

impl DifficultyProfile {
    pub fn for_level(level: Difficulty) -> Self {
        match level {
            Difficulty::Easy => Self::EASY,
            Difficulty::Medium => Self::MEDIUM,
            Difficulty::Hard => Self::HARD,
        }
    }

    pub const EASY: Self = Self {
        lookahead: false,
        strategic_discard: false,
        blunder_chance: 0.25,
        stock_source: 300,
        discard_source: 60,
        discard_depth: 5,
        hand_source: 20,
        completion: 40,
        unlocks_stock: 80,
        skip_bo_efficient: 20,
        skip_bo_waste: 20,
        feeds_opponent: 0,
        empty_pile: 20,
        same_value: 15,
        sequential: 10,
        high_value: 2,
        buries_low: 10,
        needed_value: 10,
        pile_depth: 3,
        duplicate: 5,
        needed_soon: 10,
    };

    pub const MEDIUM: Self = Self {
        lookahead: true,
        strategic_discard: true,
        blunder_chance: 0.08,
        stock_source: 600,
        discard_source: 120,
        discard_depth: 10,
        hand_source: 40,
        completion: 80,
        unlocks_stock: 200,
        skip_bo_efficient: 60,
        skip_bo_waste: 120,
        feeds_opponent: 60,
        empty_pile: 40,
        same_value: 50,
        sequential: 30,
        high_value: 4,
        buries_low: 30,
        needed_value: 40,
        pile_depth: 6,
        duplicate: 15,
        needed_soon: 25,
    };

    pub const HARD: Self = Self {
        lookahead: true,
        strategic_discard: true,
        blunder_chance: 0.0,
        stock_source: 1_000,
        discard_source: 200,
        discard_depth: 15,
        hand_source: 50,
        completion: 120,
        unlocks_stock: 400,
        skip_bo_efficient: 100,
        skip_bo_waste: 250,
        feeds_opponent: 150,
        empty_pile: 60,
        same_value: 80,
        sequential: 50,
        high_value: 6,
        buries_low: 50,
        needed_value: 70,
        pile_depth: 8,
        duplicate: 25,
        needed_soon: 40,
    };
}
