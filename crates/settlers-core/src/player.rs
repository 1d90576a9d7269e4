//! Player state and resource management.
//!
//! This module contains:
//! - Player colors and turn rotation
//! - ResourceHand for counting resource cards (hands and the shared supply)
//! - Development card types and the standard deck
//! - Building costs
//! - PlayerState, the per-color record replaced on every change

use crate::setup::Resource;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Player color. Declaration order is the turn rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlayerColor {
    Red,
    White,
    Blue,
    Orange,
}

impl PlayerColor {
    /// Fixed seating rotation, truncated to the number of players
    pub const TURN_ORDER: [PlayerColor; 4] = [
        PlayerColor::Red,
        PlayerColor::White,
        PlayerColor::Blue,
        PlayerColor::Orange,
    ];
}

/// Development card types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DevelopmentCard {
    /// Move robber and steal, counts toward Largest Army
    Knight,
    /// Worth 1 VP while held
    VictoryPoint,
    /// Build 2 roads for free
    RoadBuilding,
    /// Take any 2 resources from the supply
    YearOfPlenty,
    /// All players must give you all of one resource type
    Monopoly,
}

impl DevelopmentCard {
    /// Create the standard development card deck (25 cards), unshuffled
    pub fn standard_deck() -> Vec<DevelopmentCard> {
        let mut deck = Vec::with_capacity(25);
        deck.extend(std::iter::repeat(DevelopmentCard::Knight).take(14));
        deck.extend(std::iter::repeat(DevelopmentCard::VictoryPoint).take(5));
        deck.extend(std::iter::repeat(DevelopmentCard::RoadBuilding).take(2));
        deck.extend(std::iter::repeat(DevelopmentCard::YearOfPlenty).take(2));
        deck.extend(std::iter::repeat(DevelopmentCard::Monopoly).take(2));
        deck
    }
}

/// A multiset of resource cards
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceHand {
    pub brick: u32,
    pub lumber: u32,
    pub ore: u32,
    pub grain: u32,
    pub wool: u32,
}

impl ResourceHand {
    /// Create an empty hand
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hand with specific amounts
    pub fn with_amounts(brick: u32, lumber: u32, ore: u32, grain: u32, wool: u32) -> Self {
        Self {
            brick,
            lumber,
            ore,
            grain,
            wool,
        }
    }

    /// Create a hand with a single resource
    pub fn single(resource: Resource, amount: u32) -> Self {
        let mut hand = Self::new();
        hand.add(resource, amount);
        hand
    }

    /// The shared supply at the start of a standard match: 19 of each
    pub fn standard_supply() -> Self {
        Self::with_amounts(19, 19, 19, 19, 19)
    }

    /// Total number of resource cards
    pub fn total(&self) -> u32 {
        self.brick + self.lumber + self.ore + self.grain + self.wool
    }

    /// Check if hand is empty
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Get count of a specific resource
    pub fn get(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Brick => self.brick,
            Resource::Lumber => self.lumber,
            Resource::Ore => self.ore,
            Resource::Grain => self.grain,
            Resource::Wool => self.wool,
        }
    }

    /// Set count of a specific resource
    pub fn set(&mut self, resource: Resource, count: u32) {
        match resource {
            Resource::Brick => self.brick = count,
            Resource::Lumber => self.lumber = count,
            Resource::Ore => self.ore = count,
            Resource::Grain => self.grain = count,
            Resource::Wool => self.wool = count,
        }
    }

    /// Add resources to hand
    pub fn add(&mut self, resource: Resource, amount: u32) {
        let current = self.get(resource);
        self.set(resource, current + amount);
    }

    /// Add another hand to this one
    pub fn add_hand(&mut self, other: &ResourceHand) {
        for (resource, amount) in other.iter() {
            self.add(resource, amount);
        }
    }

    /// Whether this hand holds at least `cost` of every resource type
    pub fn contains(&self, cost: &ResourceHand) -> bool {
        Resource::ALL
            .iter()
            .all(|resource| self.get(*resource) >= cost.get(*resource))
    }

    /// This hand minus `cost`, or `None` if the hand does not contain it
    pub fn checked_sub(&self, cost: &ResourceHand) -> Option<ResourceHand> {
        if !self.contains(cost) {
            return None;
        }
        let mut rest = *self;
        for (resource, amount) in cost.iter() {
            rest.set(resource, rest.get(resource) - amount);
        }
        Some(rest)
    }

    /// Non-zero counts in `Resource::ALL` order
    pub fn iter(&self) -> impl Iterator<Item = (Resource, u32)> + '_ {
        Resource::ALL
            .into_iter()
            .map(|resource| (resource, self.get(resource)))
            .filter(|(_, amount)| *amount > 0)
    }

    /// The card at `index` when the hand is laid out in `Resource::ALL` order
    pub fn nth_card(&self, index: u32) -> Option<Resource> {
        let mut remaining = index;
        for (resource, amount) in self.iter() {
            if remaining < amount {
                return Some(resource);
            }
            remaining -= amount;
        }
        None
    }
}

/// Building costs
pub mod costs {
    use super::ResourceHand;

    /// Cost to build a road: 1 brick, 1 lumber
    pub fn road() -> ResourceHand {
        ResourceHand::with_amounts(1, 1, 0, 0, 0)
    }

    /// Cost to build a settlement: 1 brick, 1 lumber, 1 grain, 1 wool
    pub fn settlement() -> ResourceHand {
        ResourceHand::with_amounts(1, 1, 0, 1, 1)
    }

    /// Cost to upgrade to city: 3 ore, 2 grain
    pub fn city() -> ResourceHand {
        ResourceHand::with_amounts(0, 0, 3, 2, 0)
    }

    /// Cost to buy a development card: 1 ore, 1 grain, 1 wool
    pub fn development_card() -> ResourceHand {
        ResourceHand::with_amounts(0, 0, 1, 1, 1)
    }
}

/// Why a PlayerState change was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayerStateError {
    #[error("no roads left in supply")]
    NoRoadsLeft,
    #[error("no settlements left in supply")]
    NoSettlementsLeft,
    #[error("no cities left in supply")]
    NoCitiesLeft,
    #[error("hand does not contain {requested:?}")]
    MissingResources { requested: ResourceHand },
    #[error("no usable {0:?} card")]
    MissingDevelopmentCard(DevelopmentCard),
}

/// One color's private state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    resources: ResourceHand,
    development_cards: im::Vector<DevelopmentCard>,
    bought_this_turn: im::Vector<DevelopmentCard>,
    roads_remaining: u32,
    settlements_remaining: u32,
    cities_remaining: u32,
    development_cards_played_this_turn: u32,
    knights_played: u32,
    rolled_dice: bool,
}

impl PlayerState {
    /// A fresh player with the given piece supply
    pub fn new(roads: u32, settlements: u32, cities: u32) -> Self {
        Self {
            resources: ResourceHand::new(),
            development_cards: im::Vector::new(),
            bought_this_turn: im::Vector::new(),
            roads_remaining: roads,
            settlements_remaining: settlements,
            cities_remaining: cities,
            development_cards_played_this_turn: 0,
            knights_played: 0,
            rolled_dice: false,
        }
    }

    pub fn resources(&self) -> &ResourceHand {
        &self.resources
    }

    /// Cards usable this turn
    pub fn development_cards(&self) -> &im::Vector<DevelopmentCard> {
        &self.development_cards
    }

    /// Cards that become usable at the start of this color's next turn
    pub fn bought_this_turn(&self) -> &im::Vector<DevelopmentCard> {
        &self.bought_this_turn
    }

    /// Every development card held, usable or not
    pub fn development_card_count(&self) -> usize {
        self.development_cards.len() + self.bought_this_turn.len()
    }

    /// Victory point cards held in either bucket
    pub fn victory_point_cards(&self) -> u32 {
        self.development_cards
            .iter()
            .chain(self.bought_this_turn.iter())
            .filter(|card| **card == DevelopmentCard::VictoryPoint)
            .count() as u32
    }

    pub fn has_usable(&self, card: DevelopmentCard) -> bool {
        self.development_cards.contains(&card)
    }

    pub fn roads_remaining(&self) -> u32 {
        self.roads_remaining
    }

    pub fn settlements_remaining(&self) -> u32 {
        self.settlements_remaining
    }

    pub fn cities_remaining(&self) -> u32 {
        self.cities_remaining
    }

    pub fn development_cards_played_this_turn(&self) -> u32 {
        self.development_cards_played_this_turn
    }

    pub fn knights_played(&self) -> u32 {
        self.knights_played
    }

    pub fn rolled_dice(&self) -> bool {
        self.rolled_dice
    }

    // ==================== Mutators ====================

    pub fn remove_road(&self) -> Result<Self, PlayerStateError> {
        if self.roads_remaining == 0 {
            return Err(PlayerStateError::NoRoadsLeft);
        }
        Ok(Self {
            roads_remaining: self.roads_remaining - 1,
            ..self.clone()
        })
    }

    pub fn remove_settlement(&self) -> Result<Self, PlayerStateError> {
        if self.settlements_remaining == 0 {
            return Err(PlayerStateError::NoSettlementsLeft);
        }
        Ok(Self {
            settlements_remaining: self.settlements_remaining - 1,
            ..self.clone()
        })
    }

    pub fn remove_city(&self) -> Result<Self, PlayerStateError> {
        if self.cities_remaining == 0 {
            return Err(PlayerStateError::NoCitiesLeft);
        }
        Ok(Self {
            cities_remaining: self.cities_remaining - 1,
            ..self.clone()
        })
    }

    pub fn give_resources(&self, cards: &ResourceHand) -> Self {
        let mut resources = self.resources;
        resources.add_hand(cards);
        Self {
            resources,
            ..self.clone()
        }
    }

    pub fn remove_resources(&self, cards: &ResourceHand) -> Result<Self, PlayerStateError> {
        let resources = self
            .resources
            .checked_sub(cards)
            .ok_or(PlayerStateError::MissingResources { requested: *cards })?;
        Ok(Self {
            resources,
            ..self.clone()
        })
    }

    /// Goes to the bought-this-turn bucket; usable from the next turn
    pub fn give_development_card(&self, card: DevelopmentCard) -> Self {
        let mut bought_this_turn = self.bought_this_turn.clone();
        bought_this_turn.push_back(card);
        Self {
            bought_this_turn,
            ..self.clone()
        }
    }

    pub fn remove_played_development_card(
        &self,
        card: DevelopmentCard,
    ) -> Result<Self, PlayerStateError> {
        let index = self
            .development_cards
            .index_of(&card)
            .ok_or(PlayerStateError::MissingDevelopmentCard(card))?;
        let mut development_cards = self.development_cards.clone();
        development_cards.remove(index);
        let knights_played = if card == DevelopmentCard::Knight {
            self.knights_played + 1
        } else {
            self.knights_played
        };
        Ok(Self {
            development_cards,
            development_cards_played_this_turn: self.development_cards_played_this_turn + 1,
            knights_played,
            ..self.clone()
        })
    }

    pub fn mark_rolled(&self) -> Self {
        Self {
            rolled_dice: true,
            ..self.clone()
        }
    }

    /// Start of this color's turn
    pub fn next_turn(&self) -> Self {
        let mut development_cards = self.development_cards.clone();
        development_cards.append(self.bought_this_turn.clone());
        Self {
            development_cards,
            bought_this_turn: im::Vector::new(),
            development_cards_played_this_turn: 0,
            rolled_dice: false,
            ..self.clone()
        }
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new(15, 5, 4)
    }
}
