//! Fixed board configuration.
//!
//! This module contains:
//! - Resource and tile types
//! - Harbors for maritime trading
//! - `BoardSetup`, the validated tile/harbor/robber layout a match is played on
//! - The standard randomized 19-hex layout

use crate::hex::{Edge, HexCoord};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Sum of two dice
pub type RollNumber = u8;

/// Resource card types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Resource {
    Brick,
    Lumber,
    Ore,
    Grain,
    Wool,
}

impl Resource {
    /// All resource types
    pub const ALL: [Resource; 5] = [
        Resource::Brick,
        Resource::Lumber,
        Resource::Ore,
        Resource::Grain,
        Resource::Wool,
    ];
}

/// Type of hex tile on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileType {
    /// Produces a resource when its number is rolled
    Resource(Resource),
    /// Produces a resource chosen by the match's gold policy
    Gold,
    /// No production, robber's usual home
    Desert,
    /// Surrounds the playable area
    Ocean,
    /// Unexplored; nothing can be built next to it alone
    Fog,
}

impl TileType {
    /// Settlements, cities and roads may touch this tile
    pub fn is_buildable(&self) -> bool {
        matches!(self, TileType::Resource(_) | TileType::Gold | TileType::Desert)
    }

    /// The robber may be moved onto this tile
    pub fn is_robbable(&self) -> bool {
        self.is_buildable()
    }

    /// The tile pays out when its roll number comes up
    pub fn is_producing(&self) -> bool {
        matches!(self, TileType::Resource(_) | TileType::Gold)
    }
}

/// A single hex tile: its type and, for producing tiles, its roll number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    tile_type: TileType,
    roll_number: Option<RollNumber>,
}

impl Tile {
    /// A resource tile
    pub fn resource(resource: Resource, roll_number: RollNumber) -> Self {
        Self {
            tile_type: TileType::Resource(resource),
            roll_number: Some(roll_number),
        }
    }

    /// A gold tile
    pub fn gold(roll_number: RollNumber) -> Self {
        Self {
            tile_type: TileType::Gold,
            roll_number: Some(roll_number),
        }
    }

    pub fn desert() -> Self {
        Self::barren(TileType::Desert)
    }

    pub fn ocean() -> Self {
        Self::barren(TileType::Ocean)
    }

    pub fn fog() -> Self {
        Self::barren(TileType::Fog)
    }

    fn barren(tile_type: TileType) -> Self {
        Self {
            tile_type,
            roll_number: None,
        }
    }

    pub fn tile_type(&self) -> TileType {
        self.tile_type
    }

    pub fn roll_number(&self) -> Option<RollNumber> {
        self.roll_number
    }

    /// The resource this tile produces, if it is a plain resource tile
    pub fn resource_type(&self) -> Option<Resource> {
        match self.tile_type {
            TileType::Resource(resource) => Some(resource),
            _ => None,
        }
    }
}

/// What a harbor accepts in exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HarborCard {
    /// Any resource, chosen per trade
    Any,
    /// Only this resource
    Resource(Resource),
}

/// Harbor: trade `amount` cards for one card from the supply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Harbor {
    card: HarborCard,
    amount: u32,
}

impl Harbor {
    /// The 4:1 trade every color may make without owning a harbor
    pub const GLOBAL: Harbor = Harbor {
        card: HarborCard::Any,
        amount: 4,
    };

    pub fn new(card: HarborCard, amount: u32) -> Result<Self, SetupError> {
        if amount == 0 {
            return Err(SetupError::ZeroHarborAmount);
        }
        Ok(Self { card, amount })
    }

    /// 3:1 trade any resource
    pub fn generic() -> Self {
        Self {
            card: HarborCard::Any,
            amount: 3,
        }
    }

    /// 2:1 trade for a specific resource
    pub fn specific(resource: Resource) -> Self {
        Self {
            card: HarborCard::Resource(resource),
            amount: 2,
        }
    }

    pub fn card(&self) -> HarborCard {
        self.card
    }

    pub fn amount(&self) -> u32 {
        self.amount
    }
}

/// Reasons a board configuration is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error("tile {0:?} is defined more than once")]
    DuplicateTile(HexCoord),
    #[error("more than one harbor on edge {0:?}")]
    DuplicateHarbor(Edge),
    #[error("harbor on edge {0:?} does not touch an ocean tile")]
    HarborNotCoastal(Edge),
    #[error("harbor must require at least one card")]
    ZeroHarborAmount,
    #[error("robber starts on {0:?}, which has no tile")]
    MissingRobberTile(HexCoord),
}

/// Immutable tile/harbor/robber layout, validated once at construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "BoardSetupRepr", try_from = "BoardSetupRepr")]
pub struct BoardSetup {
    tiles: im::OrdMap<HexCoord, Tile>,
    harbors: im::Vector<(Edge, Harbor)>,
    robber: HexCoord,
}

impl BoardSetup {
    /// Validate and build a layout
    pub fn new(
        tiles: impl IntoIterator<Item = (HexCoord, Tile)>,
        harbors: impl IntoIterator<Item = (Edge, Harbor)>,
        robber: HexCoord,
    ) -> Result<Self, SetupError> {
        let mut tile_map = im::OrdMap::new();
        for (coord, tile) in tiles {
            if tile_map.insert(coord, tile).is_some() {
                return Err(SetupError::DuplicateTile(coord));
            }
        }

        let mut seen_edges = HashSet::new();
        let mut harbor_list = im::Vector::new();
        for (edge, harbor) in harbors {
            if !seen_edges.insert(edge) {
                return Err(SetupError::DuplicateHarbor(edge));
            }
            let coastal = edge.cells().iter().any(|cell| {
                tile_map
                    .get(cell)
                    .is_some_and(|tile: &Tile| tile.tile_type == TileType::Ocean)
            });
            if !coastal {
                return Err(SetupError::HarborNotCoastal(edge));
            }
            if harbor.amount == 0 {
                return Err(SetupError::ZeroHarborAmount);
            }
            harbor_list.push_back((edge, harbor));
        }

        if !tile_map.contains_key(&robber) {
            return Err(SetupError::MissingRobberTile(robber));
        }

        Ok(Self {
            tiles: tile_map,
            harbors: harbor_list,
            robber,
        })
    }

    /// The standard layout: 19 land hexes with shuffled tiles and numbers,
    /// an ocean ring, and nine harbors on the coast
    pub fn standard<R: Rng>(rng: &mut R) -> Self {
        let land_coords: Vec<HexCoord> = vec![
            // Center
            HexCoord::new(0, 0),
            // Ring 1
            HexCoord::new(1, 0),
            HexCoord::new(1, -1),
            HexCoord::new(0, -1),
            HexCoord::new(-1, 0),
            HexCoord::new(-1, 1),
            HexCoord::new(0, 1),
            // Ring 2
            HexCoord::new(2, 0),
            HexCoord::new(2, -1),
            HexCoord::new(2, -2),
            HexCoord::new(1, -2),
            HexCoord::new(0, -2),
            HexCoord::new(-1, -1),
            HexCoord::new(-2, 0),
            HexCoord::new(-2, 1),
            HexCoord::new(-2, 2),
            HexCoord::new(-1, 2),
            HexCoord::new(0, 2),
            HexCoord::new(1, 1),
        ];

        // 4 lumber, 4 grain, 4 wool, 3 ore, 3 brick, 1 desert (None)
        let mut tile_types: Vec<Option<Resource>> = Vec::with_capacity(land_coords.len());
        for (resource, count) in [
            (Resource::Lumber, 4),
            (Resource::Grain, 4),
            (Resource::Wool, 4),
            (Resource::Ore, 3),
            (Resource::Brick, 3),
        ] {
            tile_types.extend(std::iter::repeat(Some(resource)).take(count));
        }
        tile_types.push(None);
        tile_types.shuffle(rng);

        let producing: Vec<HexCoord> = land_coords
            .iter()
            .zip(&tile_types)
            .filter(|(_, resource)| resource.is_some())
            .map(|(coord, _)| *coord)
            .collect();
        let numbers = assign_numbers_avoiding_adjacent_68(&producing, rng);

        let mut tiles = im::OrdMap::new();
        let mut robber = HexCoord::new(0, 0);
        for (coord, resource) in land_coords.iter().zip(&tile_types) {
            match resource {
                Some(resource) => {
                    let number = numbers.get(coord).copied().unwrap_or(2);
                    tiles.insert(*coord, Tile::resource(*resource, number));
                }
                None => {
                    robber = *coord;
                    tiles.insert(*coord, Tile::desert());
                }
            }
        }

        let ocean: HashSet<HexCoord> = land_coords
            .iter()
            .flat_map(|coord| coord.neighbors())
            .filter(|coord| !tiles.contains_key(coord))
            .collect();
        for coord in ocean {
            tiles.insert(coord, Tile::ocean());
        }

        let mut harbor_types = vec![
            Harbor::generic(),
            Harbor::generic(),
            Harbor::generic(),
            Harbor::generic(),
        ];
        harbor_types.extend(Resource::ALL.map(Harbor::specific));
        harbor_types.shuffle(rng);

        let coastal = coastal_edges(&tiles);
        let harbors = select_spread_edges(&coastal, harbor_types.len(), rng)
            .into_iter()
            .zip(harbor_types)
            .collect();

        Self {
            tiles,
            harbors,
            robber,
        }
    }

    /// Get a tile by coordinate
    pub fn tile(&self, coord: &HexCoord) -> Option<&Tile> {
        self.tiles.get(coord)
    }

    /// All tiles, ordered by coordinate
    pub fn tiles(&self) -> impl Iterator<Item = (&HexCoord, &Tile)> {
        self.tiles.iter()
    }

    /// All harbors with their edges
    pub fn harbors(&self) -> impl Iterator<Item = &(Edge, Harbor)> {
        self.harbors.iter()
    }

    /// Where the robber starts
    pub fn robber(&self) -> HexCoord {
        self.robber
    }

    /// Whether pieces may be placed next to this cell
    pub fn is_buildable(&self, coord: &HexCoord) -> bool {
        self.tiles
            .get(coord)
            .is_some_and(|tile| tile.tile_type.is_buildable())
    }

    /// Producing tiles showing `roll`
    pub fn producing_tiles_for_roll(&self, roll: RollNumber) -> Vec<(HexCoord, Tile)> {
        self.tiles
            .iter()
            .filter(|(_, tile)| tile.tile_type.is_producing() && tile.roll_number == Some(roll))
            .map(|(coord, tile)| (*coord, *tile))
            .collect()
    }
}

/// Shuffle numbers until no 6 or 8 touches another 6 or 8
fn assign_numbers_avoiding_adjacent_68<R: Rng>(
    coords: &[HexCoord],
    rng: &mut R,
) -> HashMap<HexCoord, RollNumber> {
    const MAX_ATTEMPTS: usize = 100;
    let mut numbers: Vec<RollNumber> = vec![2, 3, 3, 4, 4, 5, 5, 6, 6, 8, 8, 9, 9, 10, 10, 11, 11, 12];

    let mut assignment = HashMap::new();
    for _ in 0..MAX_ATTEMPTS {
        numbers.shuffle(rng);
        assignment = coords.iter().copied().zip(numbers.iter().copied()).collect();
        if is_valid_number_placement(&assignment) {
            break;
        }
    }
    assignment
}

fn is_valid_number_placement(assignment: &HashMap<HexCoord, RollNumber>) -> bool {
    let hot = |n: RollNumber| n == 6 || n == 8;
    assignment.iter().filter(|(_, n)| hot(**n)).all(|(coord, _)| {
        coord
            .neighbors()
            .iter()
            .all(|neighbor| !assignment.get(neighbor).is_some_and(|n| hot(*n)))
    })
}

/// Edges with a land tile on one side and ocean on the other
fn coastal_edges(tiles: &im::OrdMap<HexCoord, Tile>) -> Vec<Edge> {
    let mut coastal: Vec<Edge> = tiles
        .iter()
        .filter(|(_, tile)| tile.tile_type.is_buildable())
        .flat_map(|(coord, _)| coord.edges())
        .filter(|edge| {
            edge.cells().iter().any(|cell| {
                tiles
                    .get(cell)
                    .is_some_and(|tile| tile.tile_type == TileType::Ocean)
            })
        })
        .collect();
    coastal.sort();
    coastal.dedup();
    coastal
}

/// Pick `count` edges, greedily maximizing the distance to those already picked
fn select_spread_edges<R: Rng>(candidates: &[Edge], count: usize, rng: &mut R) -> Vec<Edge> {
    let mut available = candidates.to_vec();
    available.shuffle(rng);

    let distance = |a: &Edge, b: &Edge| {
        a.cells()
            .iter()
            .flat_map(|x| b.cells().map(|y| x.distance_to(&y)))
            .min()
            .unwrap_or(0)
    };

    let mut selected: Vec<Edge> = Vec::with_capacity(count);
    while selected.len() < count && !available.is_empty() {
        let best = available
            .iter()
            .enumerate()
            .max_by_key(|(_, candidate)| {
                selected
                    .iter()
                    .map(|chosen| distance(*candidate, chosen))
                    .min()
                    .unwrap_or(u32::MAX)
            })
            .map(|(idx, _)| idx);
        match best {
            Some(idx) => selected.push(available.remove(idx)),
            None => break,
        }
    }
    selected
}

#[derive(Serialize, Deserialize)]
struct BoardSetupRepr {
    tiles: Vec<PlacedTile>,
    harbors: Vec<PlacedHarbor>,
    robber: HexCoord,
}

#[derive(Serialize, Deserialize)]
struct PlacedTile {
    hex: HexCoord,
    tile: Tile,
}

#[derive(Serialize, Deserialize)]
struct PlacedHarbor {
    edge: Edge,
    harbor: Harbor,
}

impl From<BoardSetup> for BoardSetupRepr {
    fn from(setup: BoardSetup) -> Self {
        Self {
            tiles: setup
                .tiles
                .iter()
                .map(|(hex, tile)| PlacedTile {
                    hex: *hex,
                    tile: *tile,
                })
                .collect(),
            harbors: setup
                .harbors
                .iter()
                .map(|(edge, harbor)| PlacedHarbor {
                    edge: *edge,
                    harbor: *harbor,
                })
                .collect(),
            robber: setup.robber,
        }
    }
}

impl TryFrom<BoardSetupRepr> for BoardSetup {
    type Error = SetupError;

    fn try_from(repr: BoardSetupRepr) -> Result<Self, Self::Error> {
        BoardSetup::new(
            repr.tiles.into_iter().map(|placed| (placed.hex, placed.tile)),
            repr.harbors
                .into_iter()
                .map(|placed| (placed.edge, placed.harbor)),
            repr.robber,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::EdgeDirection;
    use crate::test_support::compact_setup;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn standard() -> BoardSetup {
        BoardSetup::standard(&mut StdRng::seed_from_u64(7))
    }

    #[test]
    fn test_standard_layout_has_19_land_tiles() {
        let setup = standard();
        let land = setup
            .tiles()
            .filter(|(_, tile)| tile.tile_type().is_buildable())
            .count();
        assert_eq!(land, 19);
    }

    #[test]
    fn test_robber_starts_on_desert() {
        let setup = standard();
        let robber_tile = setup.tile(&setup.robber()).map(|tile| tile.tile_type());
        assert_eq!(robber_tile, Some(TileType::Desert));
    }

    #[test]
    fn test_standard_harbors_are_coastal_and_distinct() {
        let setup = standard();
        let harbors: Vec<_> = setup.harbors().cloned().collect();
        assert_eq!(harbors.len(), 9);

        // Revalidating through the constructor exercises every invariant.
        let rebuilt = BoardSetup::new(
            setup.tiles().map(|(coord, tile)| (*coord, *tile)),
            harbors,
            setup.robber(),
        );
        assert!(rebuilt.is_ok());
    }

    #[test]
    fn test_no_adjacent_six_and_eight() {
        for seed in 0..20 {
            let setup = BoardSetup::standard(&mut StdRng::seed_from_u64(seed));
            for (coord, tile) in setup.tiles() {
                if !matches!(tile.roll_number(), Some(6) | Some(8)) {
                    continue;
                }
                for neighbor in coord.neighbors() {
                    let neighbor_roll = setup.tile(&neighbor).and_then(|t| t.roll_number());
                    assert!(
                        !matches!(neighbor_roll, Some(6) | Some(8)),
                        "seed {} puts hot numbers side by side at {:?}",
                        seed,
                        coord
                    );
                }
            }
        }
    }

    #[test]
    fn test_duplicate_tile_rejected() {
        let result = BoardSetup::new(
            vec![
                (HexCoord::new(0, 0), Tile::desert()),
                (HexCoord::new(0, 0), Tile::resource(Resource::Ore, 4)),
            ],
            vec![],
            HexCoord::new(0, 0),
        );
        assert_eq!(result, Err(SetupError::DuplicateTile(HexCoord::new(0, 0))));
    }

    #[test]
    fn test_inland_harbor_rejected() {
        let edge = Edge::new(HexCoord::new(0, 0), EdgeDirection::East);
        let result = BoardSetup::new(
            vec![
                (HexCoord::new(0, 0), Tile::desert()),
                (HexCoord::new(1, 0), Tile::resource(Resource::Ore, 4)),
            ],
            vec![(edge, Harbor::generic())],
            HexCoord::new(0, 0),
        );
        assert_eq!(result, Err(SetupError::HarborNotCoastal(edge)));
    }

    #[test]
    fn test_overlapping_harbors_rejected() {
        let edge = Edge::new(HexCoord::new(0, 0), EdgeDirection::East);
        let same_edge = Edge::new(HexCoord::new(1, 0), EdgeDirection::West);
        let result = BoardSetup::new(
            vec![
                (HexCoord::new(0, 0), Tile::desert()),
                (HexCoord::new(1, 0), Tile::ocean()),
            ],
            vec![
                (edge, Harbor::generic()),
                (same_edge, Harbor::specific(Resource::Wool)),
            ],
            HexCoord::new(0, 0),
        );
        assert_eq!(result, Err(SetupError::DuplicateHarbor(edge)));
    }

    #[test]
    fn test_robber_needs_a_tile() {
        let result = BoardSetup::new(
            vec![(HexCoord::new(0, 0), Tile::desert())],
            vec![],
            HexCoord::new(3, 3),
        );
        assert_eq!(
            result,
            Err(SetupError::MissingRobberTile(HexCoord::new(3, 3)))
        );
    }

    #[test]
    fn test_zero_amount_harbor_rejected() {
        assert_eq!(
            Harbor::new(HarborCard::Any, 0),
            Err(SetupError::ZeroHarborAmount)
        );
    }

    #[test]
    fn test_json_revalidates() {
        let setup = compact_setup();
        let json = serde_json::to_string(&setup).unwrap();
        let parsed: BoardSetup = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, setup);

        let broken = json.replace("\"Ocean\"", "\"Desert\"");
        assert!(serde_json::from_str::<BoardSetup>(&broken).is_err());
    }

    #[test]
    fn test_producing_tiles_for_roll() {
        let setup = compact_setup();
        let eights: Vec<HexCoord> = setup
            .producing_tiles_for_roll(8)
            .into_iter()
            .map(|(coord, _)| coord)
            .collect();
        assert_eq!(eights, vec![HexCoord::new(0, 0)]);
        assert!(setup.producing_tiles_for_roll(7).is_empty());
    }
}
