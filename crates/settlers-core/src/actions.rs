//! Decisions players hand back to the engine, and what the engine tells
//! players and observers in return.

use crate::hex::{Edge, HexCoord, Intersection};
use crate::player::{DevelopmentCard, PlayerColor, ResourceHand};
use crate::setup::{Harbor, Resource, RollNumber};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==================== Player decisions ====================

/// One step of a regular turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnAction {
    /// Pass the turn on (dice must have been rolled)
    EndTurn,
    RollDice,
    BuildRoad(Edge),
    BuildSettlement(Intersection),
    /// Upgrade one of your settlements
    BuildCity(Intersection),
    BuyDevelopmentCard,
    PlayKnight(MoveRobberAction),
    /// Take every card of this type from every other color
    PlayMonopoly(Resource),
    PlayRoadBuilding {
        first: Edge,
        second: Option<Edge>,
    },
    /// One or two cards from the supply
    PlayYearOfPlenty(ResourceHand),
    /// Offer `give` to `to` in exchange for `receive`
    DomesticTrade {
        to: PlayerColor,
        give: ResourceHand,
        receive: ResourceHand,
    },
    /// Trade `harbor.amount()` cards for one `receive`. `give` names the card
    /// for a generic harbor and must be `None` for a specific one.
    MaritimeTrade {
        harbor: Harbor,
        give: Option<Resource>,
        receive: Resource,
    },
}

/// A starting settlement and the road attached to it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialTurnAction {
    pub settlement: Intersection,
    pub road: Edge,
}

/// Where the robber goes and whom it robs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRobberAction {
    pub hex: HexCoord,
    pub steal_from: Option<PlayerColor>,
}

/// Cards given up after a 7
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiscardAction(pub ResourceHand);

// ==================== Outcomes ====================

/// How a match ended
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameResults {
    pub winner: Option<PlayerColor>,
    /// Victory points of the colors still in the game
    pub scores: BTreeMap<PlayerColor, u32>,
    /// Eliminated colors, in order of elimination
    pub cheaters: Vec<PlayerColor>,
}

/// Stages of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Setup,
    InitialPlacement1,
    InitialPlacement2,
    MainLoop,
    GameOver,
}

/// One-way messages to a single player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerNotification {
    ColorsAssigned {
        color: PlayerColor,
        turn_order: Vec<PlayerColor>,
    },
    /// `payout` is what this player received from the roll
    DiceRolled {
        roller: PlayerColor,
        roll: RollNumber,
        payout: ResourceHand,
    },
    ReceivedResources {
        from: PlayerColor,
        cards: ResourceHand,
    },
    ResourcesTaken {
        by: PlayerColor,
        cards: ResourceHand,
    },
    ReceivedDevelopmentCard(DevelopmentCard),
    TradeResult {
        initiator: PlayerColor,
        responder: PlayerColor,
        accepted: bool,
    },
    Results(GameResults),
}

/// What observers are told after each applied change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    PhaseChanged(GamePhase),
    InitialPlacement {
        color: PlayerColor,
        action: InitialTurnAction,
    },
    TurnAction {
        color: PlayerColor,
        action: TurnAction,
    },
    /// The robber move that follows a 7
    RobberMoved {
        color: PlayerColor,
        action: MoveRobberAction,
    },
    CardsDiscarded {
        color: PlayerColor,
        action: DiscardAction,
    },
    PlayerEliminated {
        color: PlayerColor,
        reason: String,
    },
    GameFinished(GameResults),
}
