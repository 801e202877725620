use serde::{Deserialize, Serialize};

use crate::action::{CardSource, Difficulty, PlayerId, Selection};
use crate::card::{Card, PLAYER_COUNT, PlayedCard, deck_size};
use crate::config::GameConfig;

/// One of the shared ascending piles.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildPile {
    cards: Vec<PlayedCard>,
}

impl BuildPile {
    pub fn new() -> Self {
        Self::default()
    }

    /// A pile holding the run `1..=top`, all numbered cards.
    pub fn with_run(top: u8) -> Self {
        Self {
            cards: (1..=top)
                .map(|value| PlayedCard::new(Card::Number(value), value))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Value of the top card, 0 for an empty pile.
    pub fn top_value(&self) -> u8 {
        self.cards.last().map(|card| card.value).unwrap_or(0)
    }

    /// Value the pile accepts next.
    pub fn next_value(&self) -> u8 {
        self.top_value() + 1
    }

    pub fn cards(&self) -> &[PlayedCard] {
        &self.cards
    }

    /// Materialised values from bottom to top.
    pub fn values(&self) -> Vec<u8> {
        self.cards.iter().map(|card| card.value).collect()
    }

    pub(crate) fn push(&mut self, card: PlayedCard) {
        self.cards.push(card);
    }

    /// Empties the pile, returning the physical cards.
    pub(crate) fn take_cards(&mut self) -> Vec<Card> {
        std::mem::take(&mut self.cards)
            .into_iter()
            .map(|card| card.card())
            .collect()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerState {
    pub is_ai: bool,
    /// Top of the stock is the last element.
    pub stock: Vec<Card>,
    /// Fixed-length slots; `None` marks an empty slot.
    pub hand: Vec<Option<Card>>,
    pub discard_piles: Vec<Vec<Card>>,
}

impl PlayerState {
    pub fn new(is_ai: bool, config: &GameConfig) -> Self {
        Self {
            is_ai,
            stock: Vec::with_capacity(config.stock_size),
            hand: vec![None; config.hand_size],
            discard_piles: vec![Vec::new(); config.discard_piles],
        }
    }

    pub fn stock_top(&self) -> Option<Card> {
        self.stock.last().copied()
    }

    pub fn discard_top(&self, index: usize) -> Option<Card> {
        self.discard_piles
            .get(index)
            .and_then(|pile| pile.last())
            .copied()
    }

    pub fn hand_cards(&self) -> impl Iterator<Item = (usize, Card)> + '_ {
        self.hand
            .iter()
            .enumerate()
            .filter_map(|(slot, card)| card.map(|card| (slot, card)))
    }

    pub fn empty_slots(&self) -> Vec<usize> {
        self.hand
            .iter()
            .enumerate()
            .filter(|(_, card)| card.is_none())
            .map(|(slot, _)| slot)
            .collect()
    }

    pub fn hand_is_empty(&self) -> bool {
        self.hand.iter().all(Option::is_none)
    }

    /// Card currently at `source`, if any.
    pub fn card_at(&self, source: CardSource) -> Option<Card> {
        match source {
            CardSource::Hand(slot) => self.hand.get(slot).copied().flatten(),
            CardSource::Stock => self.stock_top(),
            CardSource::Discard(index) => self.discard_top(index),
        }
    }

    fn card_count(&self) -> usize {
        self.stock.len()
            + self.hand.iter().flatten().count()
            + self.discard_piles.iter().map(Vec::len).sum::<usize>()
    }
}

/// The canonical snapshot of a game in progress.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameState {
    pub config: GameConfig,
    /// Draw pile; cards are drawn from the end.
    pub deck: Vec<Card>,
    pub build_piles: Vec<BuildPile>,
    /// Cards of completed build piles, waiting to be shuffled back into the deck.
    pub completed_build_piles: Vec<Card>,
    pub players: [PlayerState; PLAYER_COUNT],
    pub current_player: PlayerId,
    pub selected_card: Option<Selection>,
    pub game_is_over: bool,
    pub winner: Option<PlayerId>,
    pub message: String,
    pub ai_difficulty: Difficulty,
}

impl GameState {
    /// A state with the right shape but no cards dealt; apply `Init` to start playing.
    pub fn empty(config: GameConfig) -> Self {
        Self {
            deck: Vec::new(),
            build_piles: vec![BuildPile::new(); config.build_piles],
            completed_build_piles: Vec::new(),
            players: [
                PlayerState::new(config.ai_seats[0], &config),
                PlayerState::new(config.ai_seats[1], &config),
            ],
            current_player: 0,
            selected_card: None,
            game_is_over: false,
            winner: None,
            message: String::new(),
            ai_difficulty: Difficulty::default(),
            config,
        }
    }

    pub fn current(&self) -> &PlayerState {
        &self.players[self.current_player]
    }

    pub fn opponent_index(&self) -> PlayerId {
        (self.current_player + 1) % PLAYER_COUNT
    }

    pub fn opponent(&self) -> &PlayerState {
        &self.players[self.opponent_index()]
    }

    pub(crate) fn current_mut(&mut self) -> &mut PlayerState {
        &mut self.players[self.current_player]
    }

    pub fn total_cards(&self) -> usize {
        self.deck.len()
            + self.completed_build_piles.len()
            + self.build_piles.iter().map(BuildPile::len).sum::<usize>()
            + self.players.iter().map(PlayerState::card_count).sum::<usize>()
    }

    /// Describes the first broken invariant, if any.
    pub fn check_invariants(&self) -> Result<(), String> {
        let config = &self.config;
        if self.build_piles.len() != config.build_piles {
            return Err(format!("expected {} build piles", config.build_piles));
        }
        if self.current_player >= PLAYER_COUNT {
            return Err(format!("current player {} out of range", self.current_player));
        }
        for (index, player) in self.players.iter().enumerate() {
            if player.hand.len() != config.hand_size {
                return Err(format!(
                    "player {index} has {} hand slots, expected {}",
                    player.hand.len(),
                    config.hand_size
                ));
            }
            if player.discard_piles.len() != config.discard_piles {
                return Err(format!("player {index} has the wrong number of discard piles"));
            }
            if player.discard_piles.iter().flatten().any(Card::is_skip_bo) {
                return Err(format!("player {index} has a Skip-Bo card on a discard pile"));
            }
        }
        for (index, pile) in self.build_piles.iter().enumerate() {
            if pile.len() >= config.max_value as usize {
                return Err(format!("build pile {index} should have been completed"));
            }
            let in_order = pile
                .values()
                .iter()
                .enumerate()
                .all(|(position, value)| *value as usize == position + 1);
            if !in_order {
                return Err(format!("build pile {index} is not an ascending run from 1"));
            }
        }
        let total = self.total_cards();
        if total != 0 && total != deck_size(config) {
            return Err(format!(
                "card count {total} differs from deck size {}",
                deck_size(config)
            ));
        }
        if let Some(selection) = &self.selected_card {
            if self.current().card_at(selection.source) != Some(selection.card) {
                return Err("selection no longer matches its source".into());
            }
        }
        Ok(())
    }
}
