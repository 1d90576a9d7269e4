//! Match orchestration.
//!
//! The admin is the only caller of players and observers. It walks the
//! phases `Setup -> InitialPlacement1 -> InitialPlacement2 -> MainLoop ->
//! GameOver`, asks the relevant player for each decision, validates it with
//! the rules, and applies it to the game state. Any decision that fails
//! validation eliminates its color.

use crate::actions::{
    DiscardAction, GameEvent, GamePhase, GameResults, MoveRobberAction, PlayerNotification,
    TurnAction,
};
use crate::collaborator::{Player, SafePlayer};
use crate::config::{GameConfig, GoldPolicy, ShortagePolicy};
use crate::game::{GameState, GameStateError, MatchSetup};
use crate::hex::Edge;
use crate::observer::ObserverRegistry;
use crate::player::{costs, DevelopmentCard, PlayerColor, ResourceHand};
use crate::rules::{Rules, StandardRules};
use crate::setup::{Harbor, HarborCard, Resource, RollNumber, TileType};
use futures_util::stream::{FuturesUnordered, StreamExt};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

const ROBBER_ROLL: RollNumber = 7;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("a match needs {min} to {max} players, got {count}")]
    PlayerCount { count: usize, min: usize, max: usize },
    /// A validated action could not be applied
    #[error("engine failed to apply a validated action: {0}")]
    Engine(#[from] GameStateError),
    #[error("engine invariant broken: {0}")]
    Invariant(&'static str),
}

/// Runs one match from setup to results
pub struct Admin {
    state: GameState,
    seats: BTreeMap<PlayerColor, SafePlayer>,
    rules: Arc<dyn Rules>,
    observers: ObserverRegistry,
    config: Arc<GameConfig>,
    phase: GamePhase,
    cheaters: Vec<PlayerColor>,
    actions_taken: u64,
}

impl fmt::Debug for Admin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Admin")
            .field("phase", &self.phase)
            .field("current_turn", &self.state.current_turn())
            .field("cheaters", &self.cheaters)
            .field("actions_taken", &self.actions_taken)
            .finish()
    }
}

impl Admin {
    /// Seat `players` in the fixed color rotation, first player first
    pub fn new(
        setup: MatchSetup,
        config: GameConfig,
        players: Vec<Arc<dyn Player>>,
    ) -> Result<Self, AdminError> {
        let max = PlayerColor::TURN_ORDER.len();
        let min = config.min_players.clamp(1, max);
        if players.len() < min || players.len() > max {
            return Err(AdminError::PlayerCount {
                count: players.len(),
                min,
                max,
            });
        }
        let colors = &PlayerColor::TURN_ORDER[..players.len()];
        let config = Arc::new(config);
        let state = GameState::new(setup, colors, Arc::clone(&config))?;
        let seats = colors
            .iter()
            .zip(players)
            .map(|(color, player)| (*color, SafePlayer::new(*color, player)))
            .collect();
        Ok(Self {
            state,
            seats,
            rules: Arc::new(StandardRules::new(Arc::clone(&config))),
            observers: ObserverRegistry::new(),
            config,
            phase: GamePhase::Setup,
            cheaters: Vec::new(),
            actions_taken: 0,
        })
    }

    /// Replace the standard rules
    pub fn with_rules(self, rules: Arc<dyn Rules>) -> Self {
        Self { rules, ..self }
    }

    /// Handle for subscribing observers, before or during the match
    pub fn observers(&self) -> ObserverRegistry {
        self.observers.clone()
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Play the match to the end
    pub async fn run(mut self) -> Result<GameResults, AdminError> {
        self.enter(GamePhase::Setup);
        let turn_order: Vec<PlayerColor> = self.state.turn_order().collect();
        for color in &turn_order {
            self.notify(
                *color,
                PlayerNotification::ColorsAssigned {
                    color: *color,
                    turn_order: turn_order.clone(),
                },
            );
        }

        for phase in [GamePhase::InitialPlacement1, GamePhase::InitialPlacement2] {
            if self.is_over() {
                break;
            }
            self.enter(phase);
            self.initial_placement_round().await?;
        }

        if !self.is_over() {
            self.enter(GamePhase::MainLoop);
            while !self.is_over() {
                self.main_loop_step().await?;
            }
        }

        self.enter(GamePhase::GameOver);
        let results = self.results();
        info!(winner = ?results.winner, cheaters = ?results.cheaters, "match finished");
        for color in self.state.turn_order().collect::<Vec<_>>() {
            self.notify(color, PlayerNotification::Results(results.clone()));
        }
        self.broadcast(GameEvent::GameFinished(results.clone()));
        Ok(results)
    }

    // ==================== Phases ====================

    fn enter(&mut self, phase: GamePhase) {
        info!(?phase, "entering phase");
        self.phase = phase;
        self.broadcast(GameEvent::PhaseChanged(phase));
    }

    async fn initial_placement_round(&mut self) -> Result<(), AdminError> {
        let order: Vec<PlayerColor> = self.state.turn_order().collect();
        for color in order {
            if self.is_over() {
                break;
            }
            if !self.state.is_present(color) {
                continue;
            }
            let info = self.state.turn_info(color)?;
            let action = self
                .seat(color)?
                .initial_turn_action(&info)
                .await
                .into_value();
            match self
                .rules
                .validate_initial_turn_action(&self.state, color, &action)
            {
                Ok(()) => {
                    debug!(?color, ?action, "initial placement");
                    self.state = self.state.build_initial_road_and_settlement(
                        color,
                        action.settlement,
                        action.road,
                    )?;
                    self.broadcast(GameEvent::InitialPlacement { color, action });
                }
                Err(violation) => self.eliminate(color, violation)?,
            }
        }
        Ok(())
    }

    async fn main_loop_step(&mut self) -> Result<(), AdminError> {
        let color = self.state.current_turn();
        let info = self.state.turn_info(color)?;
        let action = self.seat(color)?.turn_action(&info).await.into_value();
        self.actions_taken += 1;

        if let Err(violation) = self.rules.validate_turn_action(&self.state, color, &action) {
            return self.eliminate(color, violation);
        }
        debug!(?color, ?action, "applying turn action");
        self.apply(color, &action).await?;
        self.broadcast(GameEvent::TurnAction {
            color,
            action: action.clone(),
        });

        if action == TurnAction::RollDice && self.state.last_roll() == Some(ROBBER_ROLL) {
            self.resolve_robber_roll(color).await?;
        }
        Ok(())
    }

    // ==================== Applying actions ====================

    async fn apply(&mut self, color: PlayerColor, action: &TurnAction) -> Result<(), AdminError> {
        match action {
            TurnAction::EndTurn => {
                self.state = self.state.next_turn()?;
            }
            TurnAction::RollDice => self.roll(color)?,
            TurnAction::BuildRoad(edge) => {
                self.state = self
                    .state
                    .build_road(color, *edge)?
                    .return_resources_to_supply(color, &costs::road())?;
            }
            TurnAction::BuildSettlement(intersection) => {
                self.state = self
                    .state
                    .build_settlement(color, *intersection)?
                    .return_resources_to_supply(color, &costs::settlement())?;
            }
            TurnAction::BuildCity(intersection) => {
                self.state = self
                    .state
                    .build_city(color, *intersection)?
                    .return_resources_to_supply(color, &costs::city())?;
            }
            TurnAction::BuyDevelopmentCard => {
                let (state, card) = self.state.draw_development_card_from_supply()?;
                self.state = state
                    .give_development_card(color, card)?
                    .return_resources_to_supply(color, &costs::development_card())?;
                self.notify(color, PlayerNotification::ReceivedDevelopmentCard(card));
            }
            TurnAction::PlayKnight(robber) => {
                self.state = self
                    .state
                    .remove_played_development_card(color, DevelopmentCard::Knight)?;
                self.move_robber_and_steal(color, robber)?;
            }
            TurnAction::PlayMonopoly(resource) => {
                self.state = self
                    .state
                    .remove_played_development_card(color, DevelopmentCard::Monopoly)?;
                self.monopolize(color, *resource)?;
            }
            TurnAction::PlayRoadBuilding { first, second } => {
                let state = self
                    .state
                    .remove_played_development_card(color, DevelopmentCard::RoadBuilding)?;
                self.state = build_free_roads(&state, color, *first, *second)?;
            }
            TurnAction::PlayYearOfPlenty(cards) => {
                self.state = self
                    .state
                    .remove_played_development_card(color, DevelopmentCard::YearOfPlenty)?
                    .give_resource_cards_from_supply(color, cards)?;
            }
            TurnAction::DomesticTrade { to, give, receive } => {
                self.domestic_trade(color, *to, give, receive).await?;
            }
            TurnAction::MaritimeTrade {
                harbor,
                give,
                receive,
            } => {
                let given = harbor_card(harbor, *give)
                    .ok_or(AdminError::Invariant("maritime trade names no card to give"))?;
                self.state = self
                    .state
                    .return_resources_to_supply(
                        color,
                        &ResourceHand::single(given, harbor.amount()),
                    )?
                    .give_resource_cards_from_supply(color, &ResourceHand::single(*receive, 1))?;
            }
        }
        Ok(())
    }

    fn roll(&mut self, roller: PlayerColor) -> Result<(), AdminError> {
        let (state, roll) = self.state.roll()?;
        self.state = state;
        info!(?roller, roll, "dice rolled");
        let payouts = if roll == ROBBER_ROLL {
            BTreeMap::new()
        } else {
            self.pay_out(roll)?
        };
        for color in self.state.turn_order().collect::<Vec<_>>() {
            let payout = payouts.get(&color).copied().unwrap_or_default();
            self.notify(
                color,
                PlayerNotification::DiceRolled {
                    roller,
                    roll,
                    payout,
                },
            );
        }
        Ok(())
    }

    /// Hand out production for `roll` and return what each color received
    fn pay_out(
        &mut self,
        roll: RollNumber,
    ) -> Result<BTreeMap<PlayerColor, ResourceHand>, AdminError> {
        let owed = self.production(roll);
        for (color, cards) in &owed {
            if !cards.is_empty() {
                self.state = self.state.give_resource_cards_from_supply(*color, cards)?;
            }
        }
        Ok(owed)
    }

    /// What every present color earns from `roll`, after supply shortages
    fn production(&self, roll: RollNumber) -> BTreeMap<PlayerColor, ResourceHand> {
        let board = self.state.board();
        let mut owed: BTreeMap<PlayerColor, ResourceHand> = BTreeMap::new();
        for (hex, tile) in board.setup().producing_tiles_for_roll(roll) {
            if self.config.robber_blocks_production && hex == board.robber() {
                continue;
            }
            let resource = match (tile.tile_type(), self.config.gold_policy) {
                (TileType::Resource(resource), _) => resource,
                (TileType::Gold, GoldPolicy::Pay(resource)) => resource,
                _ => continue,
            };
            for color in self.state.turn_order() {
                let amount =
                    board.settlements_on_tile(color, &hex) + 2 * board.cities_on_tile(color, &hex);
                if amount > 0 {
                    owed.entry(color).or_default().add(resource, amount);
                }
            }
        }

        for resource in Resource::ALL {
            let demand: u32 = owed.values().map(|cards| cards.get(resource)).sum();
            let available = self.state.resource_supply().get(resource);
            if demand <= available {
                continue;
            }
            let claimants: Vec<PlayerColor> = owed
                .iter()
                .filter(|(_, cards)| cards.get(resource) > 0)
                .map(|(color, _)| *color)
                .collect();
            warn!(?resource, demand, available, "resource supply short");
            match (self.config.shortage_policy, claimants.as_slice()) {
                (ShortagePolicy::SingleRecipient, [only]) => {
                    owed.entry(*only).or_default().set(resource, available);
                }
                _ => {
                    for cards in owed.values_mut() {
                        cards.set(resource, 0);
                    }
                }
            }
        }
        owed
    }

    /// Discards from every qualifying color, then the roller moves the robber
    async fn resolve_robber_roll(&mut self, roller: PlayerColor) -> Result<(), AdminError> {
        let snapshot = self.state.clone();
        let threshold = self.config.discard_threshold;
        let mut pending = FuturesUnordered::new();
        for color in snapshot.turn_order() {
            let over = snapshot
                .player(color)
                .is_some_and(|player| player.resources().total() > threshold);
            if !over {
                continue;
            }
            let player = self.seat(color)?.clone();
            let info = snapshot.turn_info(color)?;
            pending.push(async move {
                let discard = player.discard_half(&info).await.into_value();
                (color, discard)
            });
        }

        // Answers arrive in any order; each is checked against the state
        // left by the ones before it
        while let Some((color, discard)) = pending.next().await {
            self.apply_discard(color, discard)?;
        }

        if !self.state.is_present(roller) || self.is_over() {
            return Ok(());
        }
        let info = self.state.turn_info(roller)?;
        let action = self.seat(roller)?.move_robber(&info).await.into_value();
        match self.rules.validate_move_robber(&self.state, roller, &action) {
            Ok(()) => {
                self.move_robber_and_steal(roller, &action)?;
                self.broadcast(GameEvent::RobberMoved {
                    color: roller,
                    action,
                });
                Ok(())
            }
            Err(violation) => self.eliminate(roller, violation),
        }
    }

    fn apply_discard(
        &mut self,
        color: PlayerColor,
        discard: DiscardAction,
    ) -> Result<(), AdminError> {
        if !self.state.is_present(color) {
            return Ok(());
        }
        match self.rules.validate_discard(&self.state, color, &discard) {
            Ok(()) => {
                debug!(?color, cards = ?discard.0, "discarding");
                self.state = self.state.return_resources_to_supply(color, &discard.0)?;
                self.broadcast(GameEvent::CardsDiscarded {
                    color,
                    action: discard,
                });
                Ok(())
            }
            Err(violation) => self.eliminate(color, violation),
        }
    }

    fn move_robber_and_steal(
        &mut self,
        thief: PlayerColor,
        action: &MoveRobberAction,
    ) -> Result<(), AdminError> {
        self.state = self.state.move_robber(action.hex)?;
        let Some(victim) = action.steal_from else {
            return Ok(());
        };
        let (state, card) = self.state.random_card_from_hand(victim)?;
        self.state = state;
        if let Some(card) = card {
            let cards = ResourceHand::single(card, 1);
            self.state = self.state.transfer_resources(victim, thief, &cards)?;
            self.notify_transfer(victim, thief, cards);
        }
        Ok(())
    }

    fn monopolize(&mut self, taker: PlayerColor, resource: Resource) -> Result<(), AdminError> {
        let others: Vec<PlayerColor> = self
            .state
            .turn_order()
            .filter(|color| *color != taker)
            .collect();
        for victim in others {
            let count = self.state.count_resource_cards_of_type(victim, resource);
            if count == 0 {
                continue;
            }
            let cards = ResourceHand::single(resource, count);
            self.state = self.state.transfer_resources(victim, taker, &cards)?;
            self.notify_transfer(victim, taker, cards);
        }
        Ok(())
    }

    async fn domestic_trade(
        &mut self,
        initiator: PlayerColor,
        responder: PlayerColor,
        give: &ResourceHand,
        receive: &ResourceHand,
    ) -> Result<(), AdminError> {
        let info = self.state.turn_info(responder)?;
        let accepted = self
            .seat(responder)?
            .will_accept_trade(&info, initiator, give, receive)
            .await
            .into_value();
        let failure = if accepted {
            self.rules
                .validate_trade_acceptance(&self.state, responder, receive)
                .err()
        } else {
            None
        };
        let completed = accepted && failure.is_none();
        debug!(?initiator, ?responder, completed, "trade answered");

        if completed {
            self.state = self
                .state
                .exchange_resources(initiator, responder, give, receive)?;
        }
        for color in [initiator, responder] {
            self.notify(
                color,
                PlayerNotification::TradeResult {
                    initiator,
                    responder,
                    accepted: completed,
                },
            );
        }
        if completed {
            self.notify_transfer(initiator, responder, *give);
            self.notify_transfer(responder, initiator, *receive);
        }
        match failure {
            // Agreed to a trade it cannot pay for
            Some(violation) => self.eliminate(responder, violation),
            None => Ok(()),
        }
    }

    // ==================== Bookkeeping ====================

    fn eliminate(&mut self, color: PlayerColor, reason: impl fmt::Display) -> Result<(), AdminError> {
        let reason = reason.to_string();
        info!(?color, %reason, "eliminating player");
        if self.state.player_count() > 1 {
            self.state = self.state.remove_player(color)?;
        }
        self.cheaters.push(color);
        self.broadcast(GameEvent::PlayerEliminated { color, reason });
        Ok(())
    }

    fn winner(&self) -> Option<PlayerColor> {
        let current = self.state.current_turn();
        std::iter::once(current)
            .chain(self.state.turn_order())
            .filter(|color| !self.cheaters.contains(color))
            .find(|color| self.rules.has_won(&self.state, *color))
    }

    fn is_over(&self) -> bool {
        let too_few = self.state.player_count() < self.config.min_players.max(2);
        let out_of_actions = self
            .config
            .max_turn_actions
            .is_some_and(|limit| self.actions_taken >= limit);
        too_few || out_of_actions || self.winner().is_some()
    }

    fn results(&self) -> GameResults {
        let scores = self
            .state
            .turn_order()
            .filter(|color| !self.cheaters.contains(color))
            .map(|color| (color, self.rules.victory_points(&self.state, color)))
            .collect();
        GameResults {
            winner: self.winner(),
            scores,
            cheaters: self.cheaters.clone(),
        }
    }

    fn seat(&self, color: PlayerColor) -> Result<&SafePlayer, AdminError> {
        self.seats
            .get(&color)
            .ok_or(AdminError::Engine(GameStateError::UnknownColor(color)))
    }

    fn notify(&self, color: PlayerColor, notification: PlayerNotification) {
        if let Some(seat) = self.seats.get(&color) {
            seat.notify(&notification);
        }
    }

    fn notify_transfer(&self, from: PlayerColor, to: PlayerColor, cards: ResourceHand) {
        if cards.is_empty() {
            return;
        }
        self.notify(from, PlayerNotification::ResourcesTaken { by: to, cards });
        self.notify(to, PlayerNotification::ReceivedResources { from, cards });
    }

    fn broadcast(&self, event: GameEvent) {
        if self.observers.is_empty() {
            return;
        }
        self.observers.broadcast(&event, &self.state.observable());
    }
}

/// The card a maritime trade gives up
fn harbor_card(harbor: &Harbor, give: Option<Resource>) -> Option<Resource> {
    match (harbor.card(), give) {
        (HarborCard::Any, give) => give,
        (HarborCard::Resource(resource), _) => Some(resource),
    }
}

/// Build one or two roads, in whichever order connects
fn build_free_roads(
    state: &GameState,
    color: PlayerColor,
    first: Edge,
    second: Option<Edge>,
) -> Result<GameState, GameStateError> {
    match second {
        None => state.build_road(color, first),
        Some(second) => state
            .build_road(color, first)
            .and_then(|built| built.build_road(color, second))
            .or_else(|_| {
                state
                    .build_road(color, second)
                    .and_then(|built| built.build_road(color, first))
            }),
    }
}
