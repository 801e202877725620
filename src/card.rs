use serde::{Deserialize, Serialize};

use crate::config::GameConfig;

/// Representation of a Skip-Bo card at rest (in a deck, hand, stock or discard pile).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Card {
    /// Numbered card between 1 and the configured maximum (12 by default).
    Number(u8),
    /// Skip-Bo wild card. Counts as any number when played.
    SkipBo,
}

pub const MIN_CARD_VALUE: u8 = 1;
pub const MAX_CARD_VALUE: u8 = 12;
pub const SKIP_BO_COUNT: usize = 18;
pub const COPIES_PER_VALUE: usize = 12;
pub const HAND_SIZE: usize = 5;
pub const STOCK_SIZE: usize = 30;
pub const DISCARD_PILE_COUNT: usize = 4;
pub const BUILD_PILE_COUNT: usize = 4;
pub const PLAYER_COUNT: usize = 2;

impl Card {
    /// Returns true if the card is the wildcard.
    #[inline]
    pub fn is_skip_bo(&self) -> bool {
        matches!(self, Card::SkipBo)
    }

    /// Returns the numeric value when available.
    #[inline]
    pub fn value(&self) -> Option<u8> {
        match self {
            Card::Number(v) => Some(*v),
            Card::SkipBo => None,
        }
    }

    /// Checks whether the card can legally satisfy the requested value.
    #[inline]
    pub fn matches_value(&self, value: u8) -> bool {
        debug_assert!(value >= MIN_CARD_VALUE);
        matches!(self, Card::SkipBo) || self.value() == Some(value)
    }
}

/// A card that has been placed on a build pile.
///
/// Skip-Bo cards take on the value the pile needed when they were played; `wild`
/// remembers the physical card so it returns to circulation as a Skip-Bo card once
/// the pile is completed.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct PlayedCard {
    pub value: u8,
    pub wild: bool,
}

impl PlayedCard {
    pub fn new(card: Card, value: u8) -> Self {
        Self {
            value,
            wild: card.is_skip_bo(),
        }
    }

    /// The physical card, as it re-enters the deck.
    pub fn card(&self) -> Card {
        if self.wild {
            Card::SkipBo
        } else {
            Card::Number(self.value)
        }
    }
}

/// Number of cards a deck built from `config` contains.
pub fn deck_size(config: &GameConfig) -> usize {
    config.copies_per_value * config.max_value as usize + config.skip_bo_cards
}

/// Builds the deck described by `config` in deterministic order (unshuffled).
pub fn build_deck(config: &GameConfig) -> Vec<Card> {
    let mut deck = Vec::with_capacity(deck_size(config));
    for _ in 0..config.copies_per_value {
        for value in MIN_CARD_VALUE..=config.max_value {
            deck.push(Card::Number(value));
        }
    }
    deck.extend(std::iter::repeat(Card::SkipBo).take(config.skip_bo_cards));
    deck
}

/// Builds a full 162-card Skip-Bo deck in deterministic order (unshuffled).
pub fn full_deck() -> Vec<Card> {
    build_deck(&GameConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_deck_composition() {
        let deck = full_deck();
        assert_eq!(deck.len(), 162);
        assert_eq!(deck.iter().filter(|card| card.is_skip_bo()).count(), 18);
        for value in MIN_CARD_VALUE..=MAX_CARD_VALUE {
            let copies = deck
                .iter()
                .filter(|card| card.value() == Some(value))
                .count();
            assert_eq!(copies, 12, "value {value}");
        }
    }

    #[test]
    fn wild_cards_return_as_skip_bo() {
        let played = PlayedCard::new(Card::SkipBo, 7);
        assert_eq!(played.value, 7);
        assert_eq!(played.card(), Card::SkipBo);
        assert_eq!(PlayedCard::new(Card::Number(3), 3).card(), Card::Number(3));
    }

    #[test]
    fn skip_bo_matches_any_value() {
        assert!(Card::SkipBo.matches_value(1));
        assert!(Card::SkipBo.matches_value(12));
        assert!(Card::Number(4).matches_value(4));
        assert!(!Card::Number(4).matches_value(5));
    }
}
