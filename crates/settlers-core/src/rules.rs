//! Legality checks and scoring.
//!
//! Validation never changes anything. Placement legality is decided by
//! attempting the board mutation on the current snapshot and discarding the
//! result, so the board's own invariants are the single source of truth.

use crate::actions::{DiscardAction, InitialTurnAction, MoveRobberAction, TurnAction};
use crate::board::PlacementError;
use crate::config::GameConfig;
use crate::game::GameState;
use crate::hex::{Edge, HexCoord};
use crate::player::{costs, DevelopmentCard, PlayerColor, PlayerState, ResourceHand};
use crate::setup::{Harbor, HarborCard, Resource};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

pub const LONGEST_ROAD_POINTS: u32 = 2;
pub const LARGEST_ARMY_POINTS: u32 = 2;

/// Piece kinds a color keeps a limited supply of
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Piece {
    Road,
    Settlement,
    City,
}

/// Why an action was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleViolation {
    #[error("{0:?} is not in the game")]
    UnknownColor(PlayerColor),
    #[error("it is not {0:?}'s turn")]
    NotYourTurn(PlayerColor),
    #[error("dice have not been rolled this turn")]
    DiceNotRolled,
    #[error("dice were already rolled this turn")]
    DiceAlreadyRolled,
    #[error("no {0:?} pieces left")]
    NoPiecesLeft(Piece),
    #[error("hand does not contain {0:?}")]
    InsufficientResources(ResourceHand),
    #[error(transparent)]
    IllegalPlacement(#[from] PlacementError),
    #[error("development card supply is empty")]
    DevelopmentSupplyEmpty,
    #[error("resource supply does not contain {0:?}")]
    SupplyExhausted(ResourceHand),
    #[error("no access to harbor {0:?}")]
    HarborUnavailable(Harbor),
    #[error("harbor {harbor:?} does not trade {give:?}")]
    HarborMismatch {
        harbor: Harbor,
        give: Option<Resource>,
    },
    #[error("cannot trade with yourself")]
    TradeWithSelf,
    #[error("trade offers and asks for nothing")]
    EmptyTrade,
    #[error("no usable {0:?} card")]
    CardUnavailable(DevelopmentCard),
    #[error("development card limit for this turn reached")]
    PlayLimitReached,
    #[error("year of plenty takes between 1 and {0} cards")]
    YearOfPlentyCount(u32),
    #[error("must discard {expected} cards, not {actual}")]
    WrongDiscardCount { expected: u32, actual: u32 },
    #[error("cannot steal from yourself")]
    StealFromSelf,
    #[error("{0:?} has no cards to steal")]
    NothingToSteal(PlayerColor),
    #[error("{0:?} has no building on {1:?}")]
    VictimNotOnTile(PlayerColor, HexCoord),
}

/// Legality and scoring for one rule set
pub trait Rules: fmt::Debug + Send + Sync {
    fn validate_initial_turn_action(
        &self,
        state: &GameState,
        color: PlayerColor,
        action: &InitialTurnAction,
    ) -> Result<(), RuleViolation>;

    fn validate_turn_action(
        &self,
        state: &GameState,
        color: PlayerColor,
        action: &TurnAction,
    ) -> Result<(), RuleViolation>;

    /// The robber move after a 7, also reused by the knight
    fn validate_move_robber(
        &self,
        state: &GameState,
        color: PlayerColor,
        action: &MoveRobberAction,
    ) -> Result<(), RuleViolation>;

    fn validate_discard(
        &self,
        state: &GameState,
        color: PlayerColor,
        action: &DiscardAction,
    ) -> Result<(), RuleViolation>;

    /// Whether `responder` can pay `owed` if it accepts a trade
    fn validate_trade_acceptance(
        &self,
        state: &GameState,
        responder: PlayerColor,
        owed: &ResourceHand,
    ) -> Result<(), RuleViolation>;

    fn victory_points(&self, state: &GameState, color: PlayerColor) -> u32;

    fn has_won(&self, state: &GameState, color: PlayerColor) -> bool;
}

/// The base game rules
#[derive(Debug, Clone, Default)]
pub struct StandardRules {
    config: Arc<GameConfig>,
}

impl StandardRules {
    pub fn new(config: Arc<GameConfig>) -> Self {
        Self { config }
    }

    fn usable_card(
        &self,
        player: &PlayerState,
        card: DevelopmentCard,
    ) -> Result<(), RuleViolation> {
        if !player.has_usable(card) {
            return Err(RuleViolation::CardUnavailable(card));
        }
        if player.development_cards_played_this_turn() >= self.config.development_card_play_limit
        {
            return Err(RuleViolation::PlayLimitReached);
        }
        Ok(())
    }

    fn validate_road_building(
        &self,
        state: &GameState,
        color: PlayerColor,
        player: &PlayerState,
        first: Edge,
        second: Option<Edge>,
    ) -> Result<(), RuleViolation> {
        self.usable_card(player, DevelopmentCard::RoadBuilding)?;
        let needed = if second.is_some() { 2 } else { 1 };
        if player.roads_remaining() < needed {
            return Err(RuleViolation::NoPiecesLeft(Piece::Road));
        }
        let board = state.board();
        match second {
            None => {
                board.place_road(color, first)?;
            }
            Some(second) => {
                // Either road may be the one that connects the other
                let in_order = board
                    .place_road(color, first)
                    .and_then(|board| board.place_road(color, second));
                if in_order.is_err() {
                    board
                        .place_road(color, second)
                        .and_then(|board| board.place_road(color, first))?;
                }
            }
        }
        Ok(())
    }

    fn validate_maritime_trade(
        &self,
        state: &GameState,
        color: PlayerColor,
        player: &PlayerState,
        harbor: &Harbor,
        give: Option<Resource>,
        receive: Resource,
    ) -> Result<(), RuleViolation> {
        if *harbor != Harbor::GLOBAL && !state.board().has_harbor(color, harbor) {
            return Err(RuleViolation::HarborUnavailable(*harbor));
        }
        let given = match (harbor.card(), give) {
            (HarborCard::Any, Some(resource)) => resource,
            (HarborCard::Resource(resource), None) => resource,
            _ => {
                return Err(RuleViolation::HarborMismatch {
                    harbor: *harbor,
                    give,
                })
            }
        };
        let received = ResourceHand::single(receive, 1);
        if !state.resource_supply().contains(&received) {
            return Err(RuleViolation::SupplyExhausted(received));
        }
        holds(player, &ResourceHand::single(given, harbor.amount()))
    }
}

impl Rules for StandardRules {
    fn validate_initial_turn_action(
        &self,
        state: &GameState,
        color: PlayerColor,
        action: &InitialTurnAction,
    ) -> Result<(), RuleViolation> {
        let player = present(state, color)?;
        has_piece(player.settlements_remaining(), Piece::Settlement)?;
        has_piece(player.roads_remaining(), Piece::Road)?;
        state
            .board()
            .place_initial_settlement_and_road(color, action.settlement, action.road)?;
        Ok(())
    }

    fn validate_turn_action(
        &self,
        state: &GameState,
        color: PlayerColor,
        action: &TurnAction,
    ) -> Result<(), RuleViolation> {
        let player = present(state, color)?;
        if state.current_turn() != color {
            return Err(RuleViolation::NotYourTurn(color));
        }
        match action {
            TurnAction::EndTurn => rolled(player),
            TurnAction::RollDice => {
                if player.rolled_dice() {
                    return Err(RuleViolation::DiceAlreadyRolled);
                }
                Ok(())
            }
            TurnAction::BuildRoad(edge) => {
                rolled(player)?;
                has_piece(player.roads_remaining(), Piece::Road)?;
                holds(player, &costs::road())?;
                state.board().place_road(color, *edge)?;
                Ok(())
            }
            TurnAction::BuildSettlement(intersection) => {
                rolled(player)?;
                has_piece(player.settlements_remaining(), Piece::Settlement)?;
                holds(player, &costs::settlement())?;
                state.board().place_settlement(color, *intersection)?;
                Ok(())
            }
            TurnAction::BuildCity(intersection) => {
                rolled(player)?;
                has_piece(player.cities_remaining(), Piece::City)?;
                holds(player, &costs::city())?;
                state
                    .board()
                    .upgrade_settlement_to_city(color, *intersection)?;
                Ok(())
            }
            TurnAction::BuyDevelopmentCard => {
                rolled(player)?;
                if state.development_supply_len() == 0 {
                    return Err(RuleViolation::DevelopmentSupplyEmpty);
                }
                holds(player, &costs::development_card())
            }
            TurnAction::PlayKnight(robber) => {
                self.usable_card(player, DevelopmentCard::Knight)?;
                self.validate_move_robber(state, color, robber)
            }
            TurnAction::PlayMonopoly(_) => self.usable_card(player, DevelopmentCard::Monopoly),
            TurnAction::PlayRoadBuilding { first, second } => {
                self.validate_road_building(state, color, player, *first, *second)
            }
            TurnAction::PlayYearOfPlenty(cards) => {
                self.usable_card(player, DevelopmentCard::YearOfPlenty)?;
                let limit = self.config.year_of_plenty_cards;
                if cards.is_empty() || cards.total() > limit {
                    return Err(RuleViolation::YearOfPlentyCount(limit));
                }
                if !state.resource_supply().contains(cards) {
                    return Err(RuleViolation::SupplyExhausted(*cards));
                }
                Ok(())
            }
            TurnAction::DomesticTrade { to, give, receive } => {
                rolled(player)?;
                if *to == color {
                    return Err(RuleViolation::TradeWithSelf);
                }
                present(state, *to)?;
                if give.is_empty() && receive.is_empty() {
                    return Err(RuleViolation::EmptyTrade);
                }
                holds(player, give)
            }
            TurnAction::MaritimeTrade {
                harbor,
                give,
                receive,
            } => {
                rolled(player)?;
                self.validate_maritime_trade(state, color, player, harbor, *give, *receive)
            }
        }
    }

    fn validate_move_robber(
        &self,
        state: &GameState,
        color: PlayerColor,
        action: &MoveRobberAction,
    ) -> Result<(), RuleViolation> {
        present(state, color)?;
        state.board().move_robber(action.hex)?;
        let Some(victim) = action.steal_from else {
            return Ok(());
        };
        if victim == color {
            return Err(RuleViolation::StealFromSelf);
        }
        if present(state, victim)?.resources().is_empty() {
            return Err(RuleViolation::NothingToSteal(victim));
        }
        if !state.board().colors_on_tile(&action.hex).contains(&victim) {
            return Err(RuleViolation::VictimNotOnTile(victim, action.hex));
        }
        Ok(())
    }

    fn validate_discard(
        &self,
        state: &GameState,
        color: PlayerColor,
        action: &DiscardAction,
    ) -> Result<(), RuleViolation> {
        let player = present(state, color)?;
        let DiscardAction(cards) = action;
        let expected = player.resources().total() / 2;
        if cards.total() != expected {
            return Err(RuleViolation::WrongDiscardCount {
                expected,
                actual: cards.total(),
            });
        }
        holds(player, cards)
    }

    fn validate_trade_acceptance(
        &self,
        state: &GameState,
        responder: PlayerColor,
        owed: &ResourceHand,
    ) -> Result<(), RuleViolation> {
        holds(present(state, responder)?, owed)
    }

    fn victory_points(&self, state: &GameState, color: PlayerColor) -> u32 {
        let board = state.board();
        let mut points = board.settlement_count(color) + 2 * board.city_count(color);
        points += state
            .player(color)
            .map_or(0, PlayerState::victory_point_cards);
        if state.longest_road_holder() == Some(color) {
            points += LONGEST_ROAD_POINTS;
        }
        if state.largest_army_holder() == Some(color) {
            points += LARGEST_ARMY_POINTS;
        }
        points
    }

    fn has_won(&self, state: &GameState, color: PlayerColor) -> bool {
        self.victory_points(state, color) >= self.config.victory_points_to_win
    }
}

fn present(state: &GameState, color: PlayerColor) -> Result<&PlayerState, RuleViolation> {
    state
        .player(color)
        .ok_or(RuleViolation::UnknownColor(color))
}

fn rolled(player: &PlayerState) -> Result<(), RuleViolation> {
    if player.rolled_dice() {
        Ok(())
    } else {
        Err(RuleViolation::DiceNotRolled)
    }
}

fn has_piece(remaining: u32, piece: Piece) -> Result<(), RuleViolation> {
    if remaining == 0 {
        return Err(RuleViolation::NoPiecesLeft(piece));
    }
    Ok(())
}

fn holds(player: &PlayerState, cards: &ResourceHand) -> Result<(), RuleViolation> {
    if !player.resources().contains(cards) {
        return Err(RuleViolation::InsufficientResources(*cards));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::MatchSetup;
    use crate::hex::{EdgeDirection, VertexDirection};
    use crate::random::{DeterministicDice, PriorityCardPicker};
    use crate::test_support::{compact_setup, corner, side};
    use pretty_assertions::assert_eq;

    const RED: PlayerColor = PlayerColor::Red;
    const WHITE: PlayerColor = PlayerColor::White;
    const BLUE: PlayerColor = PlayerColor::Blue;

    fn rules() -> StandardRules {
        StandardRules::default()
    }

    fn deck(cards: Vec<DevelopmentCard>) -> GameState {
        let setup = MatchSetup {
            board: compact_setup(),
            resource_supply: ResourceHand::standard_supply(),
            development_deck: cards,
            dice: Arc::new(DeterministicDice::new(vec![8]).unwrap()),
            picker: Arc::new(PriorityCardPicker::new(Resource::ALL).unwrap()),
        };
        GameState::new(setup, &[RED, WHITE, BLUE], Arc::new(GameConfig::default())).unwrap()
    }

    /// Red at (0,0) north, White at (1,0) north-east, Red has rolled
    fn placed() -> GameState {
        let state = deck(vec![DevelopmentCard::Knight])
            .build_initial_road_and_settlement(
                RED,
                corner(0, 0, VertexDirection::North),
                side(0, 0, EdgeDirection::NorthEast),
            )
            .unwrap()
            .build_initial_road_and_settlement(
                WHITE,
                corner(1, 0, VertexDirection::NorthEast),
                side(1, 0, EdgeDirection::NorthEast),
            )
            .unwrap();
        let (state, _) = state.roll().unwrap();
        state
    }

    fn with_cards(state: GameState, color: PlayerColor, cards: ResourceHand) -> GameState {
        state.give_resource_cards_from_supply(color, &cards).unwrap()
    }

    /// Give `color` a card it can play right away
    fn with_usable_card(state: GameState, color: PlayerColor, card: DevelopmentCard) -> GameState {
        let mut state = state.give_development_card(color, card).unwrap();
        while state.current_turn() != color {
            state = state.next_turn().unwrap();
        }
        for _ in 0..state.player_count() {
            state = state.next_turn().unwrap();
        }
        state
    }

    #[test]
    fn test_initial_placement_probe() {
        let state = placed();
        let legal = InitialTurnAction {
            settlement: corner(-1, 0, VertexDirection::SouthWest),
            road: side(-1, 0, EdgeDirection::West),
        };
        assert_eq!(rules().validate_initial_turn_action(&state, BLUE, &legal), Ok(()));

        let crowded = InitialTurnAction {
            settlement: corner(0, 0, VertexDirection::NorthEast),
            road: side(0, 0, EdgeDirection::East),
        };
        assert!(matches!(
            rules().validate_initial_turn_action(&state, BLUE, &crowded),
            Err(RuleViolation::IllegalPlacement(PlacementError::TooCloseToBuilding(_)))
        ));
    }

    #[test]
    fn test_roll_and_end_turn_ordering() {
        let state = deck(vec![]);
        let rules = rules();
        assert_eq!(
            rules.validate_turn_action(&state, RED, &TurnAction::EndTurn),
            Err(RuleViolation::DiceNotRolled)
        );
        assert_eq!(rules.validate_turn_action(&state, RED, &TurnAction::RollDice), Ok(()));

        let (state, _) = state.roll().unwrap();
        assert_eq!(
            rules.validate_turn_action(&state, RED, &TurnAction::RollDice),
            Err(RuleViolation::DiceAlreadyRolled)
        );
        assert_eq!(rules.validate_turn_action(&state, RED, &TurnAction::EndTurn), Ok(()));
        assert_eq!(
            rules.validate_turn_action(&state, WHITE, &TurnAction::EndTurn),
            Err(RuleViolation::NotYourTurn(WHITE))
        );
    }

    #[test]
    fn test_build_road_checks() {
        let state = placed();
        let rules = rules();
        let road = TurnAction::BuildRoad(side(0, 0, EdgeDirection::East));
        assert_eq!(
            rules.validate_turn_action(&state, RED, &road),
            Err(RuleViolation::InsufficientResources(costs::road()))
        );

        let state = with_cards(state, RED, costs::road());
        assert_eq!(rules.validate_turn_action(&state, RED, &road), Ok(()));

        let detached = TurnAction::BuildRoad(side(-1, 1, EdgeDirection::West));
        assert!(matches!(
            rules.validate_turn_action(&state, RED, &detached),
            Err(RuleViolation::IllegalPlacement(PlacementError::RoadNotConnected(_)))
        ));
    }

    #[test]
    fn test_build_requires_roll() {
        let state = with_cards(deck(vec![]), RED, costs::road());
        let road = TurnAction::BuildRoad(side(0, 0, EdgeDirection::East));
        assert_eq!(
            rules().validate_turn_action(&state, RED, &road),
            Err(RuleViolation::DiceNotRolled)
        );
    }

    #[test]
    fn test_build_city_needs_own_settlement() {
        let state = with_cards(placed(), RED, costs::city());
        let rules = rules();
        let own = TurnAction::BuildCity(corner(0, 0, VertexDirection::North));
        assert_eq!(rules.validate_turn_action(&state, RED, &own), Ok(()));
        let theirs = TurnAction::BuildCity(corner(1, 0, VertexDirection::NorthEast));
        assert!(matches!(
            rules.validate_turn_action(&state, RED, &theirs),
            Err(RuleViolation::IllegalPlacement(PlacementError::NoSettlement(_)))
        ));
    }

    #[test]
    fn test_buy_development_card() {
        let rules = rules();
        let state = with_cards(placed(), RED, costs::development_card());
        assert_eq!(
            rules.validate_turn_action(&state, RED, &TurnAction::BuyDevelopmentCard),
            Ok(())
        );
        let (empty, _) = state.draw_development_card_from_supply().unwrap();
        assert_eq!(
            rules.validate_turn_action(&empty, RED, &TurnAction::BuyDevelopmentCard),
            Err(RuleViolation::DevelopmentSupplyEmpty)
        );
    }

    #[test]
    fn test_maritime_trade() {
        let rules = rules();
        let state = with_cards(placed(), RED, ResourceHand::single(Resource::Wool, 4));
        let global = TurnAction::MaritimeTrade {
            harbor: Harbor::GLOBAL,
            give: Some(Resource::Wool),
            receive: Resource::Ore,
        };
        assert_eq!(rules.validate_turn_action(&state, RED, &global), Ok(()));

        let generic = TurnAction::MaritimeTrade {
            harbor: Harbor::generic(),
            give: Some(Resource::Wool),
            receive: Resource::Ore,
        };
        assert_eq!(
            rules.validate_turn_action(&state, RED, &generic),
            Err(RuleViolation::HarborUnavailable(Harbor::generic()))
        );

        let unnamed = TurnAction::MaritimeTrade {
            harbor: Harbor::GLOBAL,
            give: None,
            receive: Resource::Ore,
        };
        assert!(matches!(
            rules.validate_turn_action(&state, RED, &unnamed),
            Err(RuleViolation::HarborMismatch { .. })
        ));
    }

    #[test]
    fn test_maritime_trade_through_owned_harbor() {
        let rules = rules();
        // White's settlement sits on the 3:1 harbor east of (1,0)
        let mut state = placed().next_turn().unwrap();
        state = state.roll().unwrap().0;
        let generic = TurnAction::MaritimeTrade {
            harbor: Harbor::generic(),
            give: Some(Resource::Grain),
            receive: Resource::Brick,
        };
        assert_eq!(
            rules.validate_turn_action(&state, WHITE, &generic),
            Err(RuleViolation::InsufficientResources(ResourceHand::single(
                Resource::Grain,
                3
            )))
        );
        let state = with_cards(state, WHITE, ResourceHand::single(Resource::Grain, 3));
        assert_eq!(rules.validate_turn_action(&state, WHITE, &generic), Ok(()));
    }

    #[test]
    fn test_domestic_trade() {
        let rules = rules();
        let state = with_cards(placed(), RED, ResourceHand::single(Resource::Lumber, 1));
        let lumber = ResourceHand::single(Resource::Lumber, 1);
        let brick = ResourceHand::single(Resource::Brick, 1);
        let trade = |to| TurnAction::DomesticTrade {
            to,
            give: lumber,
            receive: brick,
        };
        assert_eq!(rules.validate_turn_action(&state, RED, &trade(WHITE)), Ok(()));
        assert_eq!(
            rules.validate_turn_action(&state, RED, &trade(RED)),
            Err(RuleViolation::TradeWithSelf)
        );
        assert_eq!(
            rules.validate_turn_action(&state, RED, &trade(PlayerColor::Orange)),
            Err(RuleViolation::UnknownColor(PlayerColor::Orange))
        );
        let empty = TurnAction::DomesticTrade {
            to: WHITE,
            give: ResourceHand::new(),
            receive: ResourceHand::new(),
        };
        assert_eq!(
            rules.validate_turn_action(&state, RED, &empty),
            Err(RuleViolation::EmptyTrade)
        );

        assert_eq!(
            rules.validate_trade_acceptance(&state, WHITE, &brick),
            Err(RuleViolation::InsufficientResources(brick))
        );
        let state = with_cards(state, WHITE, brick);
        assert_eq!(rules.validate_trade_acceptance(&state, WHITE, &brick), Ok(()));
    }

    #[test]
    fn test_development_card_must_be_usable() {
        let rules = rules();
        let state = placed().give_development_card(RED, DevelopmentCard::Monopoly).unwrap();
        let monopoly = TurnAction::PlayMonopoly(Resource::Ore);
        assert_eq!(
            rules.validate_turn_action(&state, RED, &monopoly),
            Err(RuleViolation::CardUnavailable(DevelopmentCard::Monopoly))
        );
    }

    #[test]
    fn test_one_development_card_per_turn() {
        let rules = rules();
        let state = with_usable_card(deck(vec![]), RED, DevelopmentCard::Monopoly);
        let state = state.give_development_card(RED, DevelopmentCard::Knight).unwrap();
        let state = with_usable_card(state, RED, DevelopmentCard::YearOfPlenty);
        let monopoly = TurnAction::PlayMonopoly(Resource::Ore);
        assert_eq!(rules.validate_turn_action(&state, RED, &monopoly), Ok(()));

        let state = state
            .remove_played_development_card(RED, DevelopmentCard::Monopoly)
            .unwrap();
        let plenty = TurnAction::PlayYearOfPlenty(ResourceHand::single(Resource::Ore, 1));
        assert_eq!(
            rules.validate_turn_action(&state, RED, &plenty),
            Err(RuleViolation::PlayLimitReached)
        );
    }

    #[test]
    fn test_year_of_plenty_limits() {
        let rules = rules();
        let state = with_usable_card(deck(vec![]), RED, DevelopmentCard::YearOfPlenty);
        let two = TurnAction::PlayYearOfPlenty(ResourceHand::with_amounts(1, 0, 0, 0, 1));
        assert_eq!(rules.validate_turn_action(&state, RED, &two), Ok(()));
        let three = TurnAction::PlayYearOfPlenty(ResourceHand::single(Resource::Ore, 3));
        assert_eq!(
            rules.validate_turn_action(&state, RED, &three),
            Err(RuleViolation::YearOfPlentyCount(2))
        );
        let none = TurnAction::PlayYearOfPlenty(ResourceHand::new());
        assert_eq!(
            rules.validate_turn_action(&state, RED, &none),
            Err(RuleViolation::YearOfPlentyCount(2))
        );
    }

    #[test]
    fn test_road_building_tries_both_orders() {
        let rules = rules();
        let state = with_usable_card(placed(), RED, DevelopmentCard::RoadBuilding);
        // SE only connects once E is down
        let reversed = TurnAction::PlayRoadBuilding {
            first: side(0, 0, EdgeDirection::SouthEast),
            second: Some(side(0, 0, EdgeDirection::East)),
        };
        assert_eq!(rules.validate_turn_action(&state, RED, &reversed), Ok(()));

        let single_detached = TurnAction::PlayRoadBuilding {
            first: side(0, 0, EdgeDirection::SouthEast),
            second: None,
        };
        assert!(matches!(
            rules.validate_turn_action(&state, RED, &single_detached),
            Err(RuleViolation::IllegalPlacement(_))
        ));
    }

    #[test]
    fn test_move_robber_and_steal() {
        let rules = rules();
        let state = with_cards(placed(), WHITE, ResourceHand::single(Resource::Ore, 1));
        let steal = |hex, steal_from| MoveRobberAction { hex, steal_from };

        assert_eq!(
            rules.validate_move_robber(&state, RED, &steal(HexCoord::new(1, 0), Some(WHITE))),
            Ok(())
        );
        assert!(matches!(
            rules.validate_move_robber(&state, RED, &steal(HexCoord::new(-1, 1), None)),
            Err(RuleViolation::IllegalPlacement(PlacementError::RobberAlreadyThere(_)))
        ));
        assert_eq!(
            rules.validate_move_robber(&state, RED, &steal(HexCoord::new(0, 0), Some(RED))),
            Err(RuleViolation::StealFromSelf)
        );
        assert_eq!(
            rules.validate_move_robber(&state, RED, &steal(HexCoord::new(0, 1), Some(WHITE))),
            Err(RuleViolation::VictimNotOnTile(WHITE, HexCoord::new(0, 1)))
        );
        assert_eq!(
            rules.validate_move_robber(&state, WHITE, &steal(HexCoord::new(0, 0), Some(RED))),
            Err(RuleViolation::NothingToSteal(RED))
        );
    }

    #[test]
    fn test_card_plays_do_not_need_roll() {
        let settled = deck(vec![])
            .build_initial_road_and_settlement(
                RED,
                corner(0, 0, VertexDirection::North),
                side(0, 0, EdgeDirection::NorthEast),
            )
            .unwrap();
        let plays = [
            (
                DevelopmentCard::Knight,
                TurnAction::PlayKnight(MoveRobberAction {
                    hex: HexCoord::new(0, 0),
                    steal_from: None,
                }),
            ),
            (DevelopmentCard::Monopoly, TurnAction::PlayMonopoly(Resource::Ore)),
            (
                DevelopmentCard::RoadBuilding,
                TurnAction::PlayRoadBuilding {
                    first: side(0, 0, EdgeDirection::East),
                    second: None,
                },
            ),
            (
                DevelopmentCard::YearOfPlenty,
                TurnAction::PlayYearOfPlenty(ResourceHand::single(Resource::Grain, 2)),
            ),
        ];
        for (card, play) in plays {
            let state = with_usable_card(settled.clone(), RED, card);
            assert!(!state.player(RED).unwrap().rolled_dice());
            assert_eq!(rules().validate_turn_action(&state, RED, &play), Ok(()), "{card:?}");
        }
    }

    #[test]
    fn test_discard_half() {
        let rules = rules();
        let state = with_cards(placed(), WHITE, ResourceHand::with_amounts(3, 2, 0, 2, 2));
        let good = DiscardAction(ResourceHand::with_amounts(2, 2, 0, 0, 0));
        assert_eq!(rules.validate_discard(&state, WHITE, &good), Ok(()));

        let short = DiscardAction(ResourceHand::single(Resource::Brick, 3));
        assert_eq!(
            rules.validate_discard(&state, WHITE, &short),
            Err(RuleViolation::WrongDiscardCount {
                expected: 4,
                actual: 3
            })
        );
        let missing = DiscardAction(ResourceHand::single(Resource::Ore, 4));
        assert_eq!(
            rules.validate_discard(&state, WHITE, &missing),
            Err(RuleViolation::InsufficientResources(missing.0))
        );
    }

    #[test]
    fn test_victory_points() {
        let rules = rules();
        let state = placed()
            .build_city(RED, corner(0, 0, VertexDirection::North))
            .unwrap()
            .give_development_card(RED, DevelopmentCard::VictoryPoint)
            .unwrap();
        assert_eq!(rules.victory_points(&state, RED), 3);
        assert_eq!(rules.victory_points(&state, WHITE), 1);
        assert!(!rules.has_won(&state, RED));

        let close = StandardRules::new(Arc::new(GameConfig {
            victory_points_to_win: 3,
            ..GameConfig::default()
        }));
        assert!(close.has_won(&state, RED));
    }
}
