//! Hooks through which the turn machine waits for the presentation layer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::time::{Duration, sleep};

use crate::action::PlayerId;
use crate::card::Card;
use crate::config::PacingConfig;

/// Logical place a card moves from or to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum CardLocation {
    Deck,
    Hand(usize),
    Stock,
    Discard(usize),
    Build(usize),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct CardMotion {
    pub card: Card,
    pub from: CardLocation,
    pub to: CardLocation,
}

/// Something the presentation layer gets to show before the game moves on.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Presentation {
    /// Cards dealt from the deck into empty hand slots at the start of a turn.
    Draw {
        player: PlayerId,
        motions: Vec<CardMotion>,
    },
    /// A bot moving a card onto a build pile.
    Play { player: PlayerId, motion: CardMotion },
    /// A bot moving a hand card onto one of its discard piles.
    Discard { player: PlayerId, motion: CardMotion },
    /// A bot is about to decide its next action.
    Think { player: PlayerId },
}

/// Present-and-wait collaborator. The returned future resolves once the
/// presentation is finished; game state is not touched until it does.
#[async_trait]
pub trait Presenter: Send {
    async fn present(&mut self, presentation: &Presentation);
}

#[async_trait]
impl<P: Presenter + ?Sized> Presenter for Box<P> {
    async fn present(&mut self, presentation: &Presentation) {
        (**self).present(presentation).await
    }
}

/// Used when no presentation layer is attached.
#[derive(Clone, Copy, Debug, Default)]
pub struct Immediate;

#[async_trait]
impl Presenter for Immediate {
    async fn present(&mut self, _presentation: &Presentation) {}
}

/// Wraps a presenter so every presentation lasts at least a minimum time,
/// even when the inner presenter resolves sooner.
pub struct Paced<P> {
    inner: P,
    pacing: PacingConfig,
}

impl<P: Presenter> Paced<P> {
    pub fn new(inner: P, pacing: PacingConfig) -> Self {
        Self { inner, pacing }
    }

    pub fn into_inner(self) -> P {
        self.inner
    }

    fn minimum_for(&self, presentation: &Presentation) -> Duration {
        match presentation {
            Presentation::Draw { .. } => self.pacing.draw(),
            Presentation::Play { .. } => self.pacing.play(),
            Presentation::Discard { .. } => self.pacing.discard(),
            Presentation::Think { .. } => self.pacing.think(),
        }
    }
}

#[async_trait]
impl<P: Presenter> Presenter for Paced<P> {
    async fn present(&mut self, presentation: &Presentation) {
        let minimum = self.minimum_for(presentation);
        tokio::join!(self.inner.present(presentation), sleep(minimum));
    }
}

#[cfg(test)]
mod tests {
    use tokio::time::Instant;

    use super::*;

    struct Slow(Duration);

    #[async_trait]
    impl Presenter for Slow {
        async fn present(&mut self, _presentation: &Presentation) {
            sleep(self.0).await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn paced_waits_at_least_the_minimum() {
        let mut paced = Paced::new(Immediate, PacingConfig::default());
        let started = Instant::now();
        paced.present(&Presentation::Think { player: 1 }).await;
        assert!(started.elapsed() >= Duration::from_millis(PacingConfig::default().think_ms));
    }

    #[tokio::test(start_paused = true)]
    async fn paced_does_not_cut_slow_presentations_short() {
        let mut paced = Paced::new(Slow(Duration::from_secs(2)), PacingConfig::default());
        let started = Instant::now();
        paced.present(&Presentation::Think { player: 0 }).await;
        assert!(started.elapsed() >= Duration::from_secs(2));
    }
}
