//! Dice and card-picking policies.
//!
//! Both are persistent values: a roll or a pick returns the policy to use
//! next time instead of mutating in place, so a `GameState` holding one stays
//! an immutable snapshot. Each comes in a seeded random flavour for real
//! matches and a deterministic flavour for tests.

use crate::player::ResourceHand;
use crate::setup::{Resource, RollNumber};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Source of dice rolls
pub trait Dice: fmt::Debug + Send + Sync {
    /// The next roll (1 to 12) and the dice positioned after it
    fn roll(&self) -> (Arc<dyn Dice>, RollNumber);
}

/// Chooses which card a thief takes from a hand
pub trait ResourceCardPicker: fmt::Debug + Send + Sync {
    /// One card from `hand`, or `None` if the hand is empty
    fn pick(&self, hand: &ResourceHand) -> (Arc<dyn ResourceCardPicker>, Option<Resource>);
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("roll sequence is empty")]
    EmptyRollSequence,
    #[error("roll {0} is outside 1..=12")]
    RollOutOfRange(RollNumber),
    #[error("priority order must list every resource exactly once")]
    IncompletePriority,
}

/// Two six-sided dice
#[derive(Debug, Clone)]
pub struct RandomDice {
    rng: StdRng,
}

impl RandomDice {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Dice for RandomDice {
    fn roll(&self) -> (Arc<dyn Dice>, RollNumber) {
        let mut rng = self.rng.clone();
        let roll = rng.gen_range(1..=6) + rng.gen_range(1..=6);
        (Arc::new(RandomDice { rng }), roll)
    }
}

/// Cycles through a fixed list of rolls
#[derive(Debug, Clone)]
pub struct DeterministicDice {
    rolls: Arc<[RollNumber]>,
    next: usize,
}

impl DeterministicDice {
    pub fn new(rolls: Vec<RollNumber>) -> Result<Self, PolicyError> {
        if rolls.is_empty() {
            return Err(PolicyError::EmptyRollSequence);
        }
        if let Some(bad) = rolls.iter().find(|roll| !(1..=12).contains(*roll)) {
            return Err(PolicyError::RollOutOfRange(*bad));
        }
        Ok(Self {
            rolls: rolls.into(),
            next: 0,
        })
    }
}

impl Dice for DeterministicDice {
    fn roll(&self) -> (Arc<dyn Dice>, RollNumber) {
        let roll = self.rolls[self.next];
        let advanced = DeterministicDice {
            rolls: Arc::clone(&self.rolls),
            next: (self.next + 1) % self.rolls.len(),
        };
        (Arc::new(advanced), roll)
    }
}

/// Every card in the hand is equally likely
#[derive(Debug, Clone)]
pub struct RandomCardPicker {
    rng: StdRng,
}

impl RandomCardPicker {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl ResourceCardPicker for RandomCardPicker {
    fn pick(&self, hand: &ResourceHand) -> (Arc<dyn ResourceCardPicker>, Option<Resource>) {
        if hand.is_empty() {
            return (Arc::new(self.clone()), None);
        }
        let mut rng = self.rng.clone();
        let index = rng.gen_range(0..hand.total());
        (Arc::new(RandomCardPicker { rng }), hand.nth_card(index))
    }
}

/// Always takes the first resource in a fixed priority order that the hand holds
#[derive(Debug, Clone)]
pub struct PriorityCardPicker {
    order: [Resource; 5],
}

impl PriorityCardPicker {
    pub fn new(order: [Resource; 5]) -> Result<Self, PolicyError> {
        let complete = Resource::ALL.iter().all(|resource| order.contains(resource));
        if !complete {
            return Err(PolicyError::IncompletePriority);
        }
        Ok(Self { order })
    }
}

impl ResourceCardPicker for PriorityCardPicker {
    fn pick(&self, hand: &ResourceHand) -> (Arc<dyn ResourceCardPicker>, Option<Resource>) {
        let choice = self
            .order
            .iter()
            .copied()
            .find(|resource| hand.get(*resource) > 0);
        (Arc::new(self.clone()), choice)
    }
}
