//! Game state: the immutable snapshot a match moves through.
//!
//! Every mutator borrows the current snapshot and returns a new one, so a
//! failed mutation leaves nothing half-applied and older snapshots stay valid
//! for anyone still holding them. The longest road and largest army holders
//! are recomputed whenever a snapshot is produced.

use crate::board::{Board, PlacementError};
use crate::config::GameConfig;
use crate::hex::{Edge, HexCoord, Intersection};
use crate::player::{DevelopmentCard, PlayerColor, PlayerState, PlayerStateError, ResourceHand};
use crate::random::{Dice, RandomCardPicker, RandomDice, ResourceCardPicker};
use crate::setup::{BoardSetup, Resource, RollNumber};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameStateError {
    #[error(transparent)]
    Placement(#[from] PlacementError),
    #[error(transparent)]
    Player(#[from] PlayerStateError),
    #[error("{0:?} is not in the game")]
    UnknownColor(PlayerColor),
    #[error("{0:?} is the last color in the game")]
    LastColor(PlayerColor),
    #[error("a game needs at least one color")]
    NoColors,
    #[error("resource supply does not contain {0:?}")]
    SupplyShort(ResourceHand),
    #[error("development card supply is empty")]
    DevelopmentCardSupplyEmpty,
}

/// Everything chosen before the first turn of a match
#[derive(Debug, Clone)]
pub struct MatchSetup {
    pub board: BoardSetup,
    pub resource_supply: ResourceHand,
    /// The top of the stack is the last element
    pub development_deck: Vec<DevelopmentCard>,
    pub dice: Arc<dyn Dice>,
    pub picker: Arc<dyn ResourceCardPicker>,
}

impl MatchSetup {
    /// Standard board, full supply, shuffled deck and random policies, all
    /// derived from one seed
    pub fn standard(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let board = BoardSetup::standard(&mut rng);
        let mut development_deck = DevelopmentCard::standard_deck();
        development_deck.shuffle(&mut rng);
        Self {
            board,
            resource_supply: ResourceHand::standard_supply(),
            development_deck,
            dice: Arc::new(RandomDice::new(rng.gen())),
            picker: Arc::new(RandomCardPicker::new(rng.gen())),
        }
    }
}

/// One point in the history of a match
#[derive(Debug, Clone)]
pub struct GameState {
    board: Board,
    players: im::OrdMap<PlayerColor, PlayerState>,
    turn_order: im::Vector<PlayerColor>,
    current_turn: PlayerColor,
    dice: Arc<dyn Dice>,
    picker: Arc<dyn ResourceCardPicker>,
    resource_supply: ResourceHand,
    development_supply: im::Vector<DevelopmentCard>,
    longest_road_holder: Option<PlayerColor>,
    largest_army_holder: Option<PlayerColor>,
    last_roll: Option<RollNumber>,
    roll_history: im::Vector<RollNumber>,
    config: Arc<GameConfig>,
}

impl GameState {
    /// The first color in `turn_order` starts
    pub fn new(
        setup: MatchSetup,
        turn_order: &[PlayerColor],
        config: Arc<GameConfig>,
    ) -> Result<Self, GameStateError> {
        let current_turn = *turn_order.first().ok_or(GameStateError::NoColors)?;
        let fresh = PlayerState::new(
            config.roads_per_player,
            config.settlements_per_player,
            config.cities_per_player,
        );
        Ok(Self {
            board: Board::new(setup.board),
            players: turn_order
                .iter()
                .map(|color| (*color, fresh.clone()))
                .collect(),
            turn_order: turn_order.iter().copied().collect(),
            current_turn,
            dice: setup.dice,
            picker: setup.picker,
            resource_supply: setup.resource_supply,
            development_supply: setup.development_deck.into_iter().collect(),
            longest_road_holder: None,
            largest_army_holder: None,
            last_roll: None,
            roll_history: im::Vector::new(),
            config,
        })
    }

    // ==================== Queries ====================

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn player(&self, color: PlayerColor) -> Option<&PlayerState> {
        self.players.get(&color)
    }

    pub fn is_present(&self, color: PlayerColor) -> bool {
        self.players.contains_key(&color)
    }

    /// Colors still in the game, in turn order
    pub fn turn_order(&self) -> impl Iterator<Item = PlayerColor> + '_ {
        self.turn_order.iter().copied()
    }

    pub fn player_count(&self) -> usize {
        self.turn_order.len()
    }

    pub fn current_turn(&self) -> PlayerColor {
        self.current_turn
    }

    pub fn resource_supply(&self) -> &ResourceHand {
        &self.resource_supply
    }

    pub fn development_supply_len(&self) -> usize {
        self.development_supply.len()
    }

    pub fn longest_road_holder(&self) -> Option<PlayerColor> {
        self.longest_road_holder
    }

    pub fn largest_army_holder(&self) -> Option<PlayerColor> {
        self.largest_army_holder
    }

    pub fn last_roll(&self) -> Option<RollNumber> {
        self.last_roll
    }

    pub fn roll_history(&self) -> &im::Vector<RollNumber> {
        &self.roll_history
    }

    /// Cards of one type in a color's hand; zero for absent colors
    pub fn count_resource_cards_of_type(&self, color: PlayerColor, resource: Resource) -> u32 {
        self.players
            .get(&color)
            .map_or(0, |player| player.resources().get(resource))
    }

    // ==================== Mutators ====================

    /// Roll the dice for the current color
    pub fn roll(&self) -> Result<(Self, RollNumber), GameStateError> {
        let (dice, roll) = self.dice.roll();
        let mut roll_history = self.roll_history.clone();
        roll_history.push_back(roll);
        let rolled = self.update_player(self.current_turn, |player| Ok(player.mark_rolled()))?;
        Ok((
            Self {
                dice,
                last_roll: Some(roll),
                roll_history,
                ..rolled
            },
            roll,
        ))
    }

    pub fn draw_development_card_from_supply(
        &self,
    ) -> Result<(Self, DevelopmentCard), GameStateError> {
        let mut development_supply = self.development_supply.clone();
        let card = development_supply
            .pop_back()
            .ok_or(GameStateError::DevelopmentCardSupplyEmpty)?;
        Ok((
            Self {
                development_supply,
                ..self.clone()
            },
            card,
        ))
    }

    /// Let the card picker choose one card from `color`'s hand. The card
    /// stays in the hand; `None` when the hand is empty.
    pub fn random_card_from_hand(
        &self,
        color: PlayerColor,
    ) -> Result<(Self, Option<Resource>), GameStateError> {
        let player = self
            .players
            .get(&color)
            .ok_or(GameStateError::UnknownColor(color))?;
        let (picker, card) = self.picker.pick(player.resources());
        Ok((
            Self {
                picker,
                ..self.clone()
            },
            card,
        ))
    }

    pub fn give_resource_cards_from_supply(
        &self,
        color: PlayerColor,
        cards: &ResourceHand,
    ) -> Result<Self, GameStateError> {
        let resource_supply = self
            .resource_supply
            .checked_sub(cards)
            .ok_or(GameStateError::SupplyShort(*cards))?;
        let state = self.update_player(color, |player| Ok(player.give_resources(cards)))?;
        Ok(Self {
            resource_supply,
            ..state
        })
    }

    pub fn return_resources_to_supply(
        &self,
        color: PlayerColor,
        cards: &ResourceHand,
    ) -> Result<Self, GameStateError> {
        let state = self.update_player(color, |player| player.remove_resources(cards))?;
        let mut resource_supply = self.resource_supply;
        resource_supply.add_hand(cards);
        Ok(Self {
            resource_supply,
            ..state
        })
    }

    /// Move cards from one hand to another
    pub fn transfer_resources(
        &self,
        from: PlayerColor,
        to: PlayerColor,
        cards: &ResourceHand,
    ) -> Result<Self, GameStateError> {
        self.update_player(from, |player| player.remove_resources(cards))?
            .update_player(to, |player| Ok(player.give_resources(cards)))
    }

    /// Both sides of a trade, or neither
    pub fn exchange_resources(
        &self,
        a: PlayerColor,
        b: PlayerColor,
        a_gives: &ResourceHand,
        b_gives: &ResourceHand,
    ) -> Result<Self, GameStateError> {
        self.update_player(a, |player| {
            Ok(player.remove_resources(a_gives)?.give_resources(b_gives))
        })?
        .update_player(b, |player| {
            Ok(player.remove_resources(b_gives)?.give_resources(a_gives))
        })
    }

    /// Drop a color from the game. Its pieces stay on the board.
    pub fn remove_player(&self, color: PlayerColor) -> Result<Self, GameStateError> {
        if !self.players.contains_key(&color) {
            return Err(GameStateError::UnknownColor(color));
        }
        if self.players.len() == 1 {
            return Err(GameStateError::LastColor(color));
        }
        let state = if self.current_turn == color {
            self.next_turn()?
        } else {
            self.clone()
        };
        let turn_order = state
            .turn_order
            .iter()
            .copied()
            .filter(|present| *present != color)
            .collect();
        Ok(Self {
            players: state.players.without(&color),
            turn_order,
            ..state
        }
        .with_bonus_holders())
    }

    /// Pass the turn to the next color still in the game
    pub fn next_turn(&self) -> Result<Self, GameStateError> {
        let index = self
            .turn_order
            .index_of(&self.current_turn)
            .ok_or(GameStateError::UnknownColor(self.current_turn))?;
        let next = self.turn_order[(index + 1) % self.turn_order.len()];
        let state = self.update_player(next, |player| Ok(player.next_turn()))?;
        Ok(Self {
            current_turn: next,
            ..state
        })
    }

    pub fn build_initial_road_and_settlement(
        &self,
        color: PlayerColor,
        settlement: Intersection,
        road: Edge,
    ) -> Result<Self, GameStateError> {
        let state =
            self.update_player(color, |player| player.remove_settlement()?.remove_road())?;
        let board = self
            .board
            .place_initial_settlement_and_road(color, settlement, road)?;
        Ok(state.with_board(board))
    }

    pub fn build_road(&self, color: PlayerColor, edge: Edge) -> Result<Self, GameStateError> {
        let state = self.update_player(color, PlayerState::remove_road)?;
        let board = self.board.place_road(color, edge)?;
        Ok(state.with_board(board))
    }

    pub fn build_settlement(
        &self,
        color: PlayerColor,
        intersection: Intersection,
    ) -> Result<Self, GameStateError> {
        let state = self.update_player(color, PlayerState::remove_settlement)?;
        let board = self.board.place_settlement(color, intersection)?;
        Ok(state.with_board(board))
    }

    /// The replaced settlement does not go back to the color's supply
    pub fn build_city(
        &self,
        color: PlayerColor,
        intersection: Intersection,
    ) -> Result<Self, GameStateError> {
        let state = self.update_player(color, PlayerState::remove_city)?;
        let board = self.board.upgrade_settlement_to_city(color, intersection)?;
        Ok(state.with_board(board))
    }

    pub fn move_robber(&self, hex: HexCoord) -> Result<Self, GameStateError> {
        let board = self.board.move_robber(hex)?;
        Ok(self.with_board(board))
    }

    pub fn give_development_card(
        &self,
        color: PlayerColor,
        card: DevelopmentCard,
    ) -> Result<Self, GameStateError> {
        self.update_player(color, |player| Ok(player.give_development_card(card)))
    }

    pub fn remove_played_development_card(
        &self,
        color: PlayerColor,
        card: DevelopmentCard,
    ) -> Result<Self, GameStateError> {
        Ok(self
            .update_player(color, |player| player.remove_played_development_card(card))?
            .with_bonus_holders())
    }

    fn update_player(
        &self,
        color: PlayerColor,
        change: impl FnOnce(&PlayerState) -> Result<PlayerState, PlayerStateError>,
    ) -> Result<Self, GameStateError> {
        let player = self
            .players
            .get(&color)
            .ok_or(GameStateError::UnknownColor(color))?;
        let updated = change(player)?;
        Ok(Self {
            players: self.players.update(color, updated),
            ..self.clone()
        })
    }

    fn with_board(&self, board: Board) -> Self {
        Self {
            board,
            ..self.clone()
        }
        .with_bonus_holders()
    }

    fn with_bonus_holders(self) -> Self {
        let roads: Vec<_> = self
            .turn_order()
            .map(|color| (color, self.board.longest_road(color)))
            .collect();
        let knights: Vec<_> = self
            .turn_order()
            .filter_map(|color| Some((color, self.players.get(&color)?.knights_played())))
            .collect();
        Self {
            longest_road_holder: sticky_holder(
                self.longest_road_holder,
                &roads,
                self.config.min_longest_road,
            ),
            largest_army_holder: sticky_holder(
                self.largest_army_holder,
                &knights,
                self.config.min_largest_army,
            ),
            ..self
        }
    }

    // ==================== Views ====================

    /// What every participant may see
    pub fn observable(&self) -> ObservableGameState {
        let players = self
            .players
            .iter()
            .map(|(color, player)| {
                let view = ObservablePlayerState {
                    resource_cards: player.resources().total(),
                    development_cards: player.development_card_count(),
                    roads_remaining: player.roads_remaining(),
                    settlements_remaining: player.settlements_remaining(),
                    cities_remaining: player.cities_remaining(),
                    knights_played: player.knights_played(),
                    development_cards_played_this_turn: player
                        .development_cards_played_this_turn(),
                    rolled_dice: player.rolled_dice(),
                    longest_road: self.board.longest_road(*color),
                };
                (*color, view)
            })
            .collect();
        ObservableGameState {
            board: self.board.clone(),
            turn_order: self.turn_order.iter().copied().collect(),
            current_turn: self.current_turn,
            last_roll: self.last_roll,
            roll_history: self.roll_history.clone(),
            resource_supply: self.resource_supply,
            development_cards_remaining: self.development_supply.len(),
            longest_road_holder: self.longest_road_holder,
            largest_army_holder: self.largest_army_holder,
            players,
        }
    }

    /// The observable state plus `color`'s own private state
    pub fn turn_info(&self, color: PlayerColor) -> Result<TurnInfo, GameStateError> {
        let player = self
            .players
            .get(&color)
            .ok_or(GameStateError::UnknownColor(color))?
            .clone();
        Ok(TurnInfo {
            color,
            player,
            game: self.observable(),
        })
    }
}

/// The holder keeps the bonus unless someone strictly beats its count.
/// Without a holder the first color in `counts` with the highest count at or
/// above `minimum` takes it.
fn sticky_holder(
    holder: Option<PlayerColor>,
    counts: &[(PlayerColor, u32)],
    minimum: u32,
) -> Option<PlayerColor> {
    let leader = counts
        .iter()
        .filter(|(_, count)| *count >= minimum)
        .fold(None, |best: Option<(PlayerColor, u32)>, &(color, count)| {
            match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((color, count)),
            }
        });
    let held = holder.and_then(|holder| {
        counts
            .iter()
            .find(|(color, _)| *color == holder)
            .map(|(_, count)| (holder, *count))
    });
    match (held, leader) {
        (Some((_, held_count)), Some((challenger, count))) if count > held_count => {
            Some(challenger)
        }
        (Some((holder, _)), _) => Some(holder),
        (None, leader) => leader.map(|(color, _)| color),
    }
}

/// Public counts for one color
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservablePlayerState {
    pub resource_cards: u32,
    pub development_cards: usize,
    pub roads_remaining: u32,
    pub settlements_remaining: u32,
    pub cities_remaining: u32,
    pub knights_played: u32,
    pub development_cards_played_this_turn: u32,
    pub rolled_dice: bool,
    pub longest_road: u32,
}

/// Read-only view of a snapshot, safe to hand to any participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservableGameState {
    pub board: Board,
    pub turn_order: Vec<PlayerColor>,
    pub current_turn: PlayerColor,
    pub last_roll: Option<RollNumber>,
    pub roll_history: im::Vector<RollNumber>,
    pub resource_supply: ResourceHand,
    pub development_cards_remaining: usize,
    pub longest_road_holder: Option<PlayerColor>,
    pub largest_army_holder: Option<PlayerColor>,
    pub players: BTreeMap<PlayerColor, ObservablePlayerState>,
}

/// What a player is shown when asked for a decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnInfo {
    pub color: PlayerColor,
    pub player: PlayerState,
    pub game: ObservableGameState,
}
