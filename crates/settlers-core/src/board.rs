//! Game board: the pieces placed on top of a `BoardSetup`.
//!
//! This module contains:
//! - Building types (settlements, cities)
//! - The `Board` overlay of settlements, cities, roads and the robber
//! - Placement rules, each returning a new `Board` or a `PlacementError`
//! - Production and scoring queries, longest road

use crate::hex::{Edge, HexCoord, Intersection};
use crate::player::PlayerColor;
use crate::setup::{BoardSetup, Harbor};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use thiserror::Error;

/// What stands on an intersection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Building {
    /// Settlement (1 VP, 1 resource per adjacent tile)
    Settlement(PlayerColor),
    /// City (2 VP, 2 resources per adjacent tile)
    City(PlayerColor),
}

impl Building {
    pub fn owner(&self) -> PlayerColor {
        match self {
            Building::Settlement(color) | Building::City(color) => *color,
        }
    }
}

/// Why a piece could not be placed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error("{0:?} does not touch a buildable tile")]
    IntersectionNotBuildable(Intersection),
    #[error("{0:?} does not touch a buildable tile")]
    EdgeNotBuildable(Edge),
    #[error("{0:?} already has a road")]
    EdgeOccupied(Edge),
    #[error("{0:?} already has a building")]
    IntersectionOccupied(Intersection),
    #[error("{0:?} is next to another building")]
    TooCloseToBuilding(Intersection),
    #[error("road {road:?} does not touch settlement {settlement:?}")]
    RoadNotAtSettlement {
        settlement: Intersection,
        road: Edge,
    },
    #[error("{0:?} is not connected to the color's network")]
    RoadNotConnected(Edge),
    #[error("{0:?} is not reached by one of the color's roads")]
    SettlementNotConnected(Intersection),
    #[error("no settlement of this color on {0:?}")]
    NoSettlement(Intersection),
    #[error("robber is already on {0:?}")]
    RobberAlreadyThere(HexCoord),
    #[error("no tile at {0:?}")]
    NoTile(HexCoord),
    #[error("robber cannot be placed on {0:?}")]
    NotRobbable(HexCoord),
}

/// Settlements, cities, roads and robber on top of a fixed setup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    setup: BoardSetup,
    settlements: im::OrdMap<PlayerColor, im::Vector<Intersection>>,
    cities: im::OrdMap<PlayerColor, im::Vector<Intersection>>,
    roads: im::OrdMap<PlayerColor, im::Vector<Edge>>,
    robber: HexCoord,
}

impl Board {
    /// An empty board with the robber on its starting cell
    pub fn new(setup: BoardSetup) -> Self {
        let robber = setup.robber();
        Self {
            setup,
            settlements: im::OrdMap::new(),
            cities: im::OrdMap::new(),
            roads: im::OrdMap::new(),
            robber,
        }
    }

    // ==================== Query Methods ====================

    pub fn setup(&self) -> &BoardSetup {
        &self.setup
    }

    /// Get the robber's current location
    pub fn robber(&self) -> HexCoord {
        self.robber
    }

    pub fn settlements_of(&self, color: PlayerColor) -> impl Iterator<Item = &Intersection> {
        self.settlements.get(&color).into_iter().flatten()
    }

    pub fn cities_of(&self, color: PlayerColor) -> impl Iterator<Item = &Intersection> {
        self.cities.get(&color).into_iter().flatten()
    }

    pub fn roads_of(&self, color: PlayerColor) -> impl Iterator<Item = &Edge> {
        self.roads.get(&color).into_iter().flatten()
    }

    /// Get the building at an intersection
    pub fn building_at(&self, intersection: &Intersection) -> Option<Building> {
        let find = |pieces: &im::OrdMap<PlayerColor, im::Vector<Intersection>>| {
            pieces
                .iter()
                .find(|(_, spots)| spots.contains(intersection))
                .map(|(color, _)| *color)
        };
        find(&self.settlements)
            .map(Building::Settlement)
            .or_else(|| find(&self.cities).map(Building::City))
    }

    /// Get the owner of the road on an edge
    pub fn road_at(&self, edge: &Edge) -> Option<PlayerColor> {
        self.roads
            .iter()
            .find(|(_, edges)| edges.contains(edge))
            .map(|(color, _)| *color)
    }

    pub fn settlement_count(&self, color: PlayerColor) -> u32 {
        self.settlements_of(color).count() as u32
    }

    pub fn city_count(&self, color: PlayerColor) -> u32 {
        self.cities_of(color).count() as u32
    }

    /// Settlements of `color` on the corners of `hex`
    pub fn settlements_on_tile(&self, color: PlayerColor, hex: &HexCoord) -> u32 {
        self.settlements_of(color)
            .filter(|spot| spot.touches_hex(hex))
            .count() as u32
    }

    /// Cities of `color` on the corners of `hex`
    pub fn cities_on_tile(&self, color: PlayerColor, hex: &HexCoord) -> u32 {
        self.cities_of(color)
            .filter(|spot| spot.touches_hex(hex))
            .count() as u32
    }

    /// Colors with a settlement or city on the corners of `hex`
    pub fn colors_on_tile(&self, hex: &HexCoord) -> BTreeSet<PlayerColor> {
        hex.intersections()
            .iter()
            .filter_map(|spot| self.building_at(spot))
            .map(|building| building.owner())
            .collect()
    }

    /// Harbors reachable through a settlement or city of `color`
    pub fn harbors_of(&self, color: PlayerColor) -> Vec<Harbor> {
        self.setup
            .harbors()
            .filter(|(edge, _)| {
                edge.intersections().iter().any(|end| {
                    self.building_at(end)
                        .is_some_and(|building| building.owner() == color)
                })
            })
            .map(|(_, harbor)| *harbor)
            .collect()
    }

    pub fn has_harbor(&self, color: PlayerColor, harbor: &Harbor) -> bool {
        self.harbors_of(color).contains(harbor)
    }

    // ==================== Validation Methods ====================

    /// Whether at least one of the three cells is buildable
    pub fn is_buildable_intersection(&self, intersection: &Intersection) -> bool {
        intersection
            .cells()
            .iter()
            .any(|cell| self.setup.is_buildable(cell))
    }

    /// Whether at least one of the two cells is buildable
    pub fn is_buildable_edge(&self, edge: &Edge) -> bool {
        edge.cells().iter().any(|cell| self.setup.is_buildable(cell))
    }

    /// Check if an intersection satisfies the distance rule (no adjacent buildings)
    pub fn satisfies_distance_rule(&self, intersection: &Intersection) -> bool {
        intersection
            .adjacent_intersections()
            .iter()
            .all(|adjacent| self.building_at(adjacent).is_none())
    }

    fn is_blocked_for(&self, color: PlayerColor, intersection: &Intersection) -> bool {
        self.building_at(intersection)
            .is_some_and(|building| building.owner() != color)
    }

    /// Check if an edge connects to a color's network
    fn is_connected_to_network(&self, color: PlayerColor, edge: &Edge) -> bool {
        edge.intersections().iter().any(|end| {
            match self.building_at(end) {
                Some(building) if building.owner() == color => true,
                // Can't extend through an enemy building
                Some(_) => false,
                None => end
                    .edges()
                    .iter()
                    .any(|other| other != edge && self.road_at(other) == Some(color)),
            }
        })
    }

    fn check_free_spot(&self, intersection: &Intersection) -> Result<(), PlacementError> {
        if !self.is_buildable_intersection(intersection) {
            return Err(PlacementError::IntersectionNotBuildable(*intersection));
        }
        if self.building_at(intersection).is_some() {
            return Err(PlacementError::IntersectionOccupied(*intersection));
        }
        if !self.satisfies_distance_rule(intersection) {
            return Err(PlacementError::TooCloseToBuilding(*intersection));
        }
        Ok(())
    }

    fn check_free_edge(&self, edge: &Edge) -> Result<(), PlacementError> {
        if !self.is_buildable_edge(edge) {
            return Err(PlacementError::EdgeNotBuildable(*edge));
        }
        if self.road_at(edge).is_some() {
            return Err(PlacementError::EdgeOccupied(*edge));
        }
        Ok(())
    }

    // ==================== Mutation Methods ====================

    /// Place a starting settlement with its road; no connection needed
    pub fn place_initial_settlement_and_road(
        &self,
        color: PlayerColor,
        settlement: Intersection,
        road: Edge,
    ) -> Result<Self, PlacementError> {
        if !road.touches(&settlement) {
            return Err(PlacementError::RoadNotAtSettlement { settlement, road });
        }
        self.check_free_edge(&road)?;
        self.check_free_spot(&settlement)?;
        Ok(self.with_settlement(color, settlement).with_road(color, road))
    }

    pub fn place_road(&self, color: PlayerColor, edge: Edge) -> Result<Self, PlacementError> {
        self.check_free_edge(&edge)?;
        if !self.is_connected_to_network(color, &edge) {
            return Err(PlacementError::RoadNotConnected(edge));
        }
        Ok(self.with_road(color, edge))
    }

    pub fn place_settlement(
        &self,
        color: PlayerColor,
        intersection: Intersection,
    ) -> Result<Self, PlacementError> {
        self.check_free_spot(&intersection)?;
        let has_road = intersection
            .edges()
            .iter()
            .any(|edge| self.road_at(edge) == Some(color));
        if !has_road {
            return Err(PlacementError::SettlementNotConnected(intersection));
        }
        Ok(self.with_settlement(color, intersection))
    }

    pub fn upgrade_settlement_to_city(
        &self,
        color: PlayerColor,
        intersection: Intersection,
    ) -> Result<Self, PlacementError> {
        let mut settlements = self.settlements.get(&color).cloned().unwrap_or_default();
        let index = settlements
            .index_of(&intersection)
            .ok_or(PlacementError::NoSettlement(intersection))?;
        settlements.remove(index);

        let mut cities = self.cities.get(&color).cloned().unwrap_or_default();
        cities.push_back(intersection);

        Ok(Self {
            settlements: self.settlements.update(color, settlements),
            cities: self.cities.update(color, cities),
            ..self.clone()
        })
    }

    /// Move the robber to a new location
    pub fn move_robber(&self, hex: HexCoord) -> Result<Self, PlacementError> {
        if hex == self.robber {
            return Err(PlacementError::RobberAlreadyThere(hex));
        }
        let tile = self.setup.tile(&hex).ok_or(PlacementError::NoTile(hex))?;
        if !tile.tile_type().is_robbable() {
            return Err(PlacementError::NotRobbable(hex));
        }
        Ok(Self {
            robber: hex,
            ..self.clone()
        })
    }

    fn with_settlement(&self, color: PlayerColor, intersection: Intersection) -> Self {
        let mut settlements = self.settlements.get(&color).cloned().unwrap_or_default();
        settlements.push_back(intersection);
        Self {
            settlements: self.settlements.update(color, settlements),
            ..self.clone()
        }
    }

    fn with_road(&self, color: PlayerColor, edge: Edge) -> Self {
        let mut roads = self.roads.get(&color).cloned().unwrap_or_default();
        roads.push_back(edge);
        Self {
            roads: self.roads.update(color, roads),
            ..self.clone()
        }
    }

    // ==================== Longest Road Calculation ====================

    /// Length of the longest simple path in `color`'s road network.
    ///
    /// Every intersection touched by one of the color's roads is tried as a
    /// starting point. A path never revisits an intersection and cannot
    /// continue past another color's building.
    pub fn longest_road(&self, color: PlayerColor) -> u32 {
        let roads: HashSet<Edge> = self.roads_of(color).copied().collect();
        let mut starts_tried = HashSet::new();
        let mut longest = 0;

        for road in &roads {
            for start in road.intersections() {
                if starts_tried.insert(start) {
                    let mut visited = HashSet::from([start]);
                    longest = longest.max(self.path_length(color, &roads, start, &mut visited));
                }
            }
        }
        longest
    }

    fn path_length(
        &self,
        color: PlayerColor,
        roads: &HashSet<Edge>,
        at: Intersection,
        visited: &mut HashSet<Intersection>,
    ) -> u32 {
        let mut best = 0;
        for edge in at.edges() {
            if !roads.contains(&edge) {
                continue;
            }
            let next = edge.other_end(&at);
            if !visited.insert(next) {
                continue;
            }
            let onward = if self.is_blocked_for(color, &next) {
                0
            } else {
                self.path_length(color, roads, next, visited)
            };
            best = best.max(1 + onward);
            visited.remove(&next);
        }
        best
    }
}
