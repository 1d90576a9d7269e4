//! Settlers - a rules engine for Catan-style board games
//!
//! This crate owns the authoritative game rules and state evolution:
//! - Hex topology for tiles, edges and intersections
//! - An immutable board overlay of settlements, cities, roads and the robber
//! - Per-color player state and the shared card supplies
//! - A rules validator and victory point scoring
//! - An admin that drives a match from setup to results
//!
//! # Architecture
//!
//! Every change produces a new [`GameState`] snapshot; nothing is mutated in
//! place. Players and observers are collaborators behind traits, so a match
//! can be played by in-process bots, remote clients, or a mix of both.
//!
//! # Modules
//!
//! - [`hex`]: Coordinate system for hex tiles, edges and intersections
//! - [`setup`]: Fixed board configuration (tiles, numbers, harbors)
//! - [`board`]: Pieces on the board and placement rules
//! - [`player`]: Player state, resource hands and building costs
//! - [`game`]: The game state snapshot and its transitions
//! - [`rules`]: Action validation and scoring
//! - [`admin`]: Match orchestration
//! - [`collaborator`], [`observer`], [`remote`]: The boundary to players and
//!   observers

pub mod actions;
pub mod admin;
pub mod board;
pub mod collaborator;
pub mod config;
pub mod game;
pub mod hex;
pub mod observer;
pub mod player;
pub mod random;
pub mod remote;
pub mod rules;
pub mod setup;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use actions::{
    DiscardAction, GameEvent, GamePhase, GameResults, InitialTurnAction, MoveRobberAction,
    PlayerNotification, TurnAction,
};
pub use admin::{Admin, AdminError};
pub use board::{Board, Building, PlacementError};
pub use collaborator::{CollaboratorError, Player, Response, SafePlayer};
pub use config::{GameConfig, GoldPolicy, ShortagePolicy};
pub use game::{
    GameState, GameStateError, MatchSetup, ObservableGameState, ObservablePlayerState, TurnInfo,
};
pub use hex::{Edge, EdgeDirection, HexCoord, Intersection, VertexDirection};
pub use observer::{GameObserver, ObserverId, ObserverRegistry};
pub use player::{costs, DevelopmentCard, PlayerColor, PlayerState, ResourceHand};
pub use random::{
    DeterministicDice, Dice, PriorityCardPicker, RandomCardPicker, RandomDice, ResourceCardPicker,
};
pub use remote::{CodecError, JsonCodec, PlayerCodec, PlayerRequest, RemotePlayer, Transport};
pub use rules::{Rules, RuleViolation, StandardRules};
pub use setup::{BoardSetup, Harbor, HarborCard, Resource, RollNumber, SetupError, Tile, TileType};
