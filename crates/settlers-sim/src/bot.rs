//! Random-move bots.
//!
//! A bot lists every move it believes the rules will accept and picks one
//! uniformly. It only sees what the engine hands a player: its own state and
//! the public view of the game.

use async_trait::async_trait;
use rand::prelude::*;
use settlers_core::{
    costs, CollaboratorError, DevelopmentCard, DiscardAction, Edge, GameConfig, Harbor,
    HarborCard, InitialTurnAction, Intersection, MoveRobberAction, Player, PlayerColor,
    PlayerState, Resource, ResourceHand, TurnAction, TurnInfo,
};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, PoisonError};

/// A bot that plays random legal moves
#[derive(Debug)]
pub struct RandomBot {
    config: Arc<GameConfig>,
    rng: Mutex<StdRng>,
}

impl RandomBot {
    pub fn with_seed(config: Arc<GameConfig>, seed: u64) -> Self {
        Self {
            config,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn choose<T: Clone>(&self, candidates: &[T]) -> Option<T> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        candidates.choose(&mut *rng).cloned()
    }

    fn can_play(&self, player: &PlayerState, card: DevelopmentCard) -> bool {
        player.has_usable(card)
            && player.development_cards_played_this_turn() < self.config.development_card_play_limit
    }

    fn turn_candidates(&self, info: &TurnInfo) -> Vec<TurnAction> {
        let player = &info.player;
        let mut actions = Vec::new();

        if self.can_play(player, DevelopmentCard::Knight) {
            actions.extend(robber_moves(info).into_iter().map(TurnAction::PlayKnight));
        }
        if self.can_play(player, DevelopmentCard::Monopoly) {
            actions.extend(Resource::ALL.into_iter().map(TurnAction::PlayMonopoly));
        }
        if !player.rolled_dice() {
            actions.push(TurnAction::RollDice);
            return actions;
        }

        actions.push(TurnAction::EndTurn);
        actions.extend(self.build_candidates(info));
        actions.extend(self.card_candidates(info));
        actions.extend(maritime_trades(info));
        actions.extend(self.domestic_offer(info));
        actions
    }

    fn build_candidates(&self, info: &TurnInfo) -> Vec<TurnAction> {
        let board = &info.game.board;
        let player = &info.player;
        let hand = player.resources();
        let mut actions = Vec::new();

        if player.roads_remaining() > 0 && hand.contains(&costs::road()) {
            actions.extend(
                open_edges(info)
                    .into_iter()
                    .filter(|edge| board.place_road(info.color, *edge).is_ok())
                    .map(TurnAction::BuildRoad),
            );
        }
        if player.settlements_remaining() > 0 && hand.contains(&costs::settlement()) {
            actions.extend(
                spots(info)
                    .into_iter()
                    .filter(|spot| board.place_settlement(info.color, *spot).is_ok())
                    .map(TurnAction::BuildSettlement),
            );
        }
        if player.cities_remaining() > 0 && hand.contains(&costs::city()) {
            actions.extend(
                board
                    .settlements_of(info.color)
                    .copied()
                    .map(TurnAction::BuildCity),
            );
        }
        if info.game.development_cards_remaining > 0
            && hand.contains(&costs::development_card())
        {
            actions.push(TurnAction::BuyDevelopmentCard);
        }
        actions
    }

    fn card_candidates(&self, info: &TurnInfo) -> Vec<TurnAction> {
        let player = &info.player;
        let supply = &info.game.resource_supply;
        let mut actions = Vec::new();

        if self.can_play(player, DevelopmentCard::YearOfPlenty) && self.config.year_of_plenty_cards > 0
        {
            actions.extend(
                Resource::ALL
                    .into_iter()
                    .map(|resource| ResourceHand::single(resource, 1))
                    .filter(|cards| supply.contains(cards))
                    .map(TurnAction::PlayYearOfPlenty),
            );
        }
        if self.can_play(player, DevelopmentCard::RoadBuilding) && player.roads_remaining() > 0 {
            actions.extend(
                open_edges(info)
                    .into_iter()
                    .filter(|edge| info.game.board.place_road(info.color, *edge).is_ok())
                    .map(|first| TurnAction::PlayRoadBuilding {
                        first,
                        second: None,
                    }),
            );
        }
        actions
    }

    /// One card for one card with a random opponent
    fn domestic_offer(&self, info: &TurnInfo) -> Option<TurnAction> {
        let hand = info.player.resources();
        let opponents: Vec<PlayerColor> = info
            .game
            .players
            .keys()
            .copied()
            .filter(|color| *color != info.color)
            .collect();
        let to = self.choose(&opponents)?;
        let offered: Vec<Resource> = hand.iter().map(|(resource, _)| resource).collect();
        let give = self.choose(&offered)?;
        let wanted: Vec<Resource> = Resource::ALL
            .into_iter()
            .filter(|resource| *resource != give)
            .collect();
        let receive = self.choose(&wanted)?;
        Some(TurnAction::DomesticTrade {
            to,
            give: ResourceHand::single(give, 1),
            receive: ResourceHand::single(receive, 1),
        })
    }

    fn random_discard(&self, hand: &ResourceHand) -> ResourceHand {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let mut left = *hand;
        let mut discard = ResourceHand::new();
        for _ in 0..hand.total() / 2 {
            let Some(card) = left.nth_card(rng.gen_range(0..left.total())) else {
                break;
            };
            left.set(card, left.get(card) - 1);
            discard.add(card, 1);
        }
        discard
    }
}

#[async_trait]
impl Player for RandomBot {
    async fn initial_turn_action(
        &self,
        info: &TurnInfo,
    ) -> Result<InitialTurnAction, CollaboratorError> {
        let board = &info.game.board;
        let candidates: Vec<InitialTurnAction> = spots(info)
            .into_iter()
            .flat_map(|settlement| {
                settlement
                    .edges()
                    .into_iter()
                    .map(move |road| InitialTurnAction { settlement, road })
            })
            .filter(|action| {
                board
                    .place_initial_settlement_and_road(info.color, action.settlement, action.road)
                    .is_ok()
            })
            .collect();
        self.choose(&candidates)
            .ok_or_else(|| CollaboratorError::Failed("no legal starting spot".to_string()))
    }

    async fn turn_action(&self, info: &TurnInfo) -> Result<TurnAction, CollaboratorError> {
        self.choose(&self.turn_candidates(info))
            .ok_or_else(|| CollaboratorError::Failed("no legal action".to_string()))
    }

    async fn discard_half(&self, info: &TurnInfo) -> Result<DiscardAction, CollaboratorError> {
        Ok(DiscardAction(self.random_discard(info.player.resources())))
    }

    async fn move_robber(&self, info: &TurnInfo) -> Result<MoveRobberAction, CollaboratorError> {
        self.choose(&robber_moves(info))
            .ok_or_else(|| CollaboratorError::Failed("nowhere to move the robber".to_string()))
    }

    async fn will_accept_trade(
        &self,
        info: &TurnInfo,
        _from: PlayerColor,
        _they_give: &ResourceHand,
        they_receive: &ResourceHand,
    ) -> Result<bool, CollaboratorError> {
        if !info.player.resources().contains(they_receive) {
            return Ok(false);
        }
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(rng.gen_bool(0.5))
    }
}

/// Every intersection touching a buildable tile
fn spots(info: &TurnInfo) -> BTreeSet<Intersection> {
    info.game
        .board
        .setup()
        .tiles()
        .filter(|(_, tile)| tile.tile_type().is_buildable())
        .flat_map(|(hex, _)| hex.intersections())
        .collect()
}

/// Free edges next to the color's roads and buildings
fn open_edges(info: &TurnInfo) -> BTreeSet<Edge> {
    let board = &info.game.board;
    let from_roads = board
        .roads_of(info.color)
        .flat_map(|road| road.adjacent_edges());
    let from_buildings = board
        .settlements_of(info.color)
        .chain(board.cities_of(info.color))
        .flat_map(|spot| spot.edges());
    from_roads
        .chain(from_buildings)
        .filter(|edge| board.road_at(edge).is_none())
        .collect()
}

fn robber_moves(info: &TurnInfo) -> Vec<MoveRobberAction> {
    let board = &info.game.board;
    let mut moves = Vec::new();
    for (hex, _) in board.setup().tiles() {
        if board.move_robber(*hex).is_err() {
            continue;
        }
        moves.push(MoveRobberAction {
            hex: *hex,
            steal_from: None,
        });
        for victim in board.colors_on_tile(hex) {
            let has_cards = info
                .game
                .players
                .get(&victim)
                .is_some_and(|player| player.resource_cards > 0);
            if victim != info.color && has_cards {
                moves.push(MoveRobberAction {
                    hex: *hex,
                    steal_from: Some(victim),
                });
            }
        }
    }
    moves
}

fn maritime_trades(info: &TurnInfo) -> Vec<TurnAction> {
    let hand = info.player.resources();
    let supply = &info.game.resource_supply;
    let mut harbors = info.game.board.harbors_of(info.color);
    harbors.push(Harbor::GLOBAL);

    let mut trades = Vec::new();
    for harbor in harbors {
        let offers: Vec<(Option<Resource>, Resource)> = match harbor.card() {
            HarborCard::Any => Resource::ALL
                .into_iter()
                .map(|resource| (Some(resource), resource))
                .collect(),
            HarborCard::Resource(resource) => vec![(None, resource)],
        };
        for (give, given) in offers {
            if hand.get(given) < harbor.amount() {
                continue;
            }
            for receive in Resource::ALL {
                if receive != given && supply.get(receive) > 0 {
                    trades.push(TurnAction::MaritimeTrade {
                        harbor,
                        give,
                        receive,
                    });
                }
            }
        }
    }
    trades
}
