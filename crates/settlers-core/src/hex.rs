//! Hex coordinate system using axial coordinates (q, r).
//!
//! This module provides the geometric primitives of the board:
//! - `HexCoord`: Identifies a single hex cell
//! - `Edge`: The side shared by two adjacent cells, where roads are placed
//! - `Intersection`: The corner shared by three cells, where settlements and cities are placed
//!
//! Edges and intersections are stored in a canonical form anchored on their
//! smallest cell, so the same geometric feature compares equal no matter which
//! neighboring cell it was derived from.

use serde::{Deserialize, Serialize};

/// Direction of a side of a hex (pointy-top orientation)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EdgeDirection {
    /// Top-right side
    NorthEast,
    /// Right side
    East,
    /// Bottom-right side
    SouthEast,
    /// Bottom-left side
    SouthWest,
    /// Left side
    West,
    /// Top-left side
    NorthWest,
}

impl EdgeDirection {
    /// All edge directions in clockwise order starting from NorthEast
    pub const ALL: [EdgeDirection; 6] = [
        EdgeDirection::NorthEast,
        EdgeDirection::East,
        EdgeDirection::SouthEast,
        EdgeDirection::SouthWest,
        EdgeDirection::West,
        EdgeDirection::NorthWest,
    ];

    fn index(self) -> usize {
        match self {
            EdgeDirection::NorthEast => 0,
            EdgeDirection::East => 1,
            EdgeDirection::SouthEast => 2,
            EdgeDirection::SouthWest => 3,
            EdgeDirection::West => 4,
            EdgeDirection::NorthWest => 5,
        }
    }

    /// Rotate clockwise by `steps` sixths of a turn
    pub fn rotated_clockwise(self, steps: usize) -> Self {
        Self::ALL[(self.index() + steps) % 6]
    }

    /// The direction pointing back from the neighbor
    pub fn opposite(self) -> Self {
        self.rotated_clockwise(3)
    }

    /// The two corners at the ends of this side, in clockwise order
    pub fn corners(self) -> [VertexDirection; 2] {
        match self {
            EdgeDirection::NorthEast => [VertexDirection::North, VertexDirection::NorthEast],
            EdgeDirection::East => [VertexDirection::NorthEast, VertexDirection::SouthEast],
            EdgeDirection::SouthEast => [VertexDirection::SouthEast, VertexDirection::South],
            EdgeDirection::SouthWest => [VertexDirection::South, VertexDirection::SouthWest],
            EdgeDirection::West => [VertexDirection::SouthWest, VertexDirection::NorthWest],
            EdgeDirection::NorthWest => [VertexDirection::NorthWest, VertexDirection::North],
        }
    }
}

/// Direction of a corner of a hex (pointy-top orientation)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VertexDirection {
    North,
    NorthEast,
    SouthEast,
    South,
    SouthWest,
    NorthWest,
}

impl VertexDirection {
    /// All corners in clockwise order starting from North
    pub const ALL: [VertexDirection; 6] = [
        VertexDirection::North,
        VertexDirection::NorthEast,
        VertexDirection::SouthEast,
        VertexDirection::South,
        VertexDirection::SouthWest,
        VertexDirection::NorthWest,
    ];

    /// The two sides that meet at this corner, in clockwise order.
    ///
    /// The pair is always consecutive in `EdgeDirection::ALL`, which is what
    /// makes the two neighbors in those directions adjacent to each other.
    pub fn sides(self) -> [EdgeDirection; 2] {
        match self {
            VertexDirection::North => [EdgeDirection::NorthWest, EdgeDirection::NorthEast],
            VertexDirection::NorthEast => [EdgeDirection::NorthEast, EdgeDirection::East],
            VertexDirection::SouthEast => [EdgeDirection::East, EdgeDirection::SouthEast],
            VertexDirection::South => [EdgeDirection::SouthEast, EdgeDirection::SouthWest],
            VertexDirection::SouthWest => [EdgeDirection::SouthWest, EdgeDirection::West],
            VertexDirection::NorthWest => [EdgeDirection::West, EdgeDirection::NorthWest],
        }
    }
}

/// Axial coordinate for hex grid.
///
/// In axial coordinates:
/// - `q` increases going east (right)
/// - `r` increases going southeast
/// - The third coordinate `s` (not stored) satisfies: q + r + s = 0
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct HexCoord {
    /// Column (increases going east)
    pub q: i32,
    /// Row (increases going southeast)
    pub r: i32,
}

impl HexCoord {
    /// Create a new hex coordinate
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// The implicit third coordinate (s = -q - r)
    pub const fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// The six neighboring hexes in clockwise order starting from NorthEast
    pub fn neighbors(&self) -> [HexCoord; 6] {
        EdgeDirection::ALL.map(|dir| self.neighbor(dir))
    }

    /// Get the neighbor in a specific direction
    pub fn neighbor(&self, direction: EdgeDirection) -> HexCoord {
        match direction {
            EdgeDirection::East => HexCoord::new(self.q + 1, self.r),
            EdgeDirection::NorthEast => HexCoord::new(self.q + 1, self.r - 1),
            EdgeDirection::NorthWest => HexCoord::new(self.q, self.r - 1),
            EdgeDirection::West => HexCoord::new(self.q - 1, self.r),
            EdgeDirection::SouthWest => HexCoord::new(self.q - 1, self.r + 1),
            EdgeDirection::SouthEast => HexCoord::new(self.q, self.r + 1),
        }
    }

    /// Direction of `other` if it is an adjacent hex
    pub fn direction_to(&self, other: &HexCoord) -> Option<EdgeDirection> {
        EdgeDirection::ALL
            .into_iter()
            .find(|dir| self.neighbor(*dir) == *other)
    }

    /// Distance to another hex (in hex steps)
    pub fn distance_to(&self, other: &HexCoord) -> u32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = (self.s() - other.s()).abs();
        ((dq + dr + ds) / 2) as u32
    }

    /// All six sides of this hex
    pub fn edges(&self) -> [Edge; 6] {
        EdgeDirection::ALL.map(|dir| Edge::new(*self, dir))
    }

    /// All six corners of this hex
    pub fn intersections(&self) -> [Intersection; 6] {
        VertexDirection::ALL.map(|corner| Intersection::new(*self, corner))
    }
}

/// The side shared by two adjacent hexes.
///
/// Canonical form: anchored on the smaller of the two cells, with the
/// direction pointing at the larger one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "EdgeRepr")]
pub struct Edge {
    hex: HexCoord,
    direction: EdgeDirection,
}

#[derive(Deserialize)]
struct EdgeRepr {
    hex: HexCoord,
    direction: EdgeDirection,
}

impl From<EdgeRepr> for Edge {
    fn from(repr: EdgeRepr) -> Self {
        Edge::new(repr.hex, repr.direction)
    }
}

impl Edge {
    /// The side of `hex` facing `direction`
    pub fn new(hex: HexCoord, direction: EdgeDirection) -> Self {
        let other = hex.neighbor(direction);
        if hex <= other {
            Self { hex, direction }
        } else {
            Self {
                hex: other,
                direction: direction.opposite(),
            }
        }
    }

    /// The side between two cells, if they are adjacent
    pub fn between(a: HexCoord, b: HexCoord) -> Option<Self> {
        a.direction_to(&b).map(|dir| Edge::new(a, dir))
    }

    /// Anchor cell of the canonical form
    pub fn hex(&self) -> HexCoord {
        self.hex
    }

    /// Direction from the anchor cell
    pub fn direction(&self) -> EdgeDirection {
        self.direction
    }

    /// The two cells on either side of this edge
    pub fn cells(&self) -> [HexCoord; 2] {
        [self.hex, self.hex.neighbor(self.direction)]
    }

    /// The two intersections at the ends of this edge
    pub fn intersections(&self) -> [Intersection; 2] {
        self.direction
            .corners()
            .map(|corner| Intersection::new(self.hex, corner))
    }

    /// Whether `intersection` is one of the endpoints
    pub fn touches(&self, intersection: &Intersection) -> bool {
        self.intersections().contains(intersection)
    }

    /// The endpoint that is not `end`
    pub fn other_end(&self, end: &Intersection) -> Intersection {
        let [a, b] = self.intersections();
        if a == *end {
            b
        } else {
            a
        }
    }

    /// The four edges sharing an endpoint with this one
    pub fn adjacent_edges(&self) -> Vec<Edge> {
        self.intersections()
            .iter()
            .flat_map(|end| end.edges())
            .filter(|edge| edge != self)
            .collect()
    }
}

/// The corner shared by three mutually adjacent hexes.
///
/// Canonical form: anchored on the smallest of the three cells, with the
/// corner of that cell pointing at the intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "IntersectionRepr")]
pub struct Intersection {
    hex: HexCoord,
    corner: VertexDirection,
}

#[derive(Deserialize)]
struct IntersectionRepr {
    hex: HexCoord,
    corner: VertexDirection,
}

impl From<IntersectionRepr> for Intersection {
    fn from(repr: IntersectionRepr) -> Self {
        Intersection::new(repr.hex, repr.corner)
    }
}

impl Intersection {
    /// The `corner` of `hex`
    pub fn new(hex: HexCoord, corner: VertexDirection) -> Self {
        let cells = Self::sorted_cells(hex, corner);
        let anchor = cells[0];
        let canonical = VertexDirection::ALL
            .into_iter()
            .find(|candidate| Self::sorted_cells(anchor, *candidate) == cells);
        match canonical {
            Some(corner) => Self {
                hex: anchor,
                corner,
            },
            // Unreachable: each of the three cells has one corner here
            None => Self { hex, corner },
        }
    }

    /// The intersection where three cells meet, if they are mutually adjacent
    pub fn from_cells(a: HexCoord, b: HexCoord, c: HexCoord) -> Option<Self> {
        let mut wanted = [a, b, c];
        wanted.sort();
        VertexDirection::ALL
            .into_iter()
            .find(|corner| Self::sorted_cells(a, *corner) == wanted)
            .map(|corner| Intersection::new(a, corner))
    }

    fn sorted_cells(hex: HexCoord, corner: VertexDirection) -> [HexCoord; 3] {
        let [first, second] = corner.sides();
        let mut cells = [hex, hex.neighbor(first), hex.neighbor(second)];
        cells.sort();
        cells
    }

    /// Anchor cell of the canonical form
    pub fn hex(&self) -> HexCoord {
        self.hex
    }

    /// Corner of the anchor cell
    pub fn corner(&self) -> VertexDirection {
        self.corner
    }

    /// The three cells meeting here, sorted
    pub fn cells(&self) -> [HexCoord; 3] {
        Self::sorted_cells(self.hex, self.corner)
    }

    /// Whether `hex` is one of the three cells meeting here
    pub fn touches_hex(&self, hex: &HexCoord) -> bool {
        self.cells().contains(hex)
    }

    /// The three edges ending here
    pub fn edges(&self) -> [Edge; 3] {
        let [first, second] = self.corner.sides();
        [
            Edge::new(self.hex, first),
            Edge::new(self.hex, second),
            Edge::new(self.hex.neighbor(first), first.rotated_clockwise(2)),
        ]
    }

    /// The three intersections one edge away
    pub fn adjacent_intersections(&self) -> [Intersection; 3] {
        self.edges().map(|edge| edge.other_end(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_hex_neighbors() {
        let center = HexCoord::new(0, 0);
        let neighbors = center.neighbors();

        assert_eq!(neighbors.len(), 6);
        for neighbor in neighbors {
            assert_eq!(center.distance_to(&neighbor), 1);
        }
    }

    #[test]
    fn test_direction_to() {
        let center = HexCoord::new(2, -1);
        for dir in EdgeDirection::ALL {
            assert_eq!(center.direction_to(&center.neighbor(dir)), Some(dir));
        }
        assert_eq!(center.direction_to(&HexCoord::new(4, -1)), None);
    }

    #[test]
    fn test_hex_distance() {
        let a = HexCoord::new(0, 0);
        let b = HexCoord::new(2, -1);
        assert_eq!(a.distance_to(&b), 2);
        assert_eq!(b.distance_to(&a), 2);
    }

    #[test]
    fn test_corner_sides_are_adjacent_neighbors() {
        let hex = HexCoord::new(0, 0);
        for corner in VertexDirection::ALL {
            let [first, second] = corner.sides();
            let a = hex.neighbor(first);
            let b = hex.neighbor(second);
            assert_eq!(a.distance_to(&b), 1, "corner {:?}", corner);
            assert_eq!(a.direction_to(&b), Some(first.rotated_clockwise(2)));
        }
    }

    #[test]
    fn test_edge_equal_from_both_sides() {
        let hex = HexCoord::new(1, -2);
        for dir in EdgeDirection::ALL {
            let from_here = Edge::new(hex, dir);
            let from_there = Edge::new(hex.neighbor(dir), dir.opposite());
            assert_eq!(from_here, from_there);
            assert_eq!(Edge::between(hex.neighbor(dir), hex), Some(from_here));
        }
    }

    #[test]
    fn test_edge_between_distant_cells() {
        assert_eq!(Edge::between(HexCoord::new(0, 0), HexCoord::new(2, 0)), None);
    }

    #[test]
    fn test_intersection_equal_from_all_three_cells() {
        let hex = HexCoord::new(0, 0);
        for corner in VertexDirection::ALL {
            let original = Intersection::new(hex, corner);
            let [a, b, c] = original.cells();
            for cell in [a, b, c] {
                let from_cell = cell
                    .intersections()
                    .into_iter()
                    .filter(|i| *i == original)
                    .count();
                assert_eq!(from_cell, 1, "cell {:?} should see {:?} once", cell, original);
            }
            assert_eq!(Intersection::from_cells(c, a, b), Some(original));
        }
    }

    #[test]
    fn test_from_cells_rejects_non_triangle() {
        let result = Intersection::from_cells(
            HexCoord::new(0, 0),
            HexCoord::new(1, 0),
            HexCoord::new(2, 0),
        );
        assert_eq!(result, None);
    }

    #[test]
    fn test_hex_edges_and_intersections_unique() {
        let hex = HexCoord::new(0, 0);
        let edges: HashSet<_> = hex.edges().into_iter().collect();
        let corners: HashSet<_> = hex.intersections().into_iter().collect();
        assert_eq!(edges.len(), 6);
        assert_eq!(corners.len(), 6);
    }

    #[test]
    fn test_shared_corners_between_neighbors() {
        let a = HexCoord::new(0, 0);
        let b = HexCoord::new(1, 0);
        let a_corners: HashSet<_> = a.intersections().into_iter().collect();
        let b_corners: HashSet<_> = b.intersections().into_iter().collect();
        let shared: HashSet<_> = a_corners.intersection(&b_corners).copied().collect();
        let edge_ends: HashSet<_> = Edge::new(a, EdgeDirection::East)
            .intersections()
            .into_iter()
            .collect();
        assert_eq!(shared, edge_ends);
    }

    #[test]
    fn test_intersection_edges_end_at_intersection() {
        let intersection = Intersection::new(HexCoord::new(-1, 2), VertexDirection::SouthWest);
        let edges = intersection.edges();
        let unique: HashSet<_> = edges.iter().collect();
        assert_eq!(unique.len(), 3);
        for edge in edges {
            assert!(edge.touches(&intersection));
        }
    }

    #[test]
    fn test_adjacent_intersections_are_symmetric() {
        let origin = Intersection::new(HexCoord::new(0, 0), VertexDirection::North);
        let adjacent = origin.adjacent_intersections();
        let unique: HashSet<_> = adjacent.iter().collect();
        assert_eq!(unique.len(), 3);
        assert!(!unique.contains(&origin));
        for neighbor in adjacent {
            assert!(neighbor.adjacent_intersections().contains(&origin));
            let shared = neighbor
                .cells()
                .iter()
                .filter(|cell| origin.touches_hex(cell))
                .count();
            assert_eq!(shared, 2);
        }
    }

    #[test]
    fn test_adjacent_edges() {
        let edge = Edge::new(HexCoord::new(0, 0), EdgeDirection::NorthEast);
        let adjacent = edge.adjacent_edges();
        assert_eq!(adjacent.len(), 4);
        assert!(!adjacent.contains(&edge));
        for other in &adjacent {
            assert!(edge.intersections().iter().any(|end| other.touches(end)));
        }
    }

    #[test]
    fn test_every_corner_has_a_canonical_anchor() {
        for q in -2..=2 {
            for r in -2..=2 {
                let hex = HexCoord::new(q, r);
                for corner in VertexDirection::ALL {
                    let spot = Intersection::new(hex, corner);
                    assert_eq!(spot.hex(), spot.cells()[0]);
                    assert!(spot.touches_hex(&hex));
                }
            }
        }
    }

    #[test]
    fn test_deserialize_canonicalizes() {
        let edge: Edge =
            serde_json::from_str(r#"{"hex":{"q":1,"r":0},"direction":"West"}"#).unwrap();
        assert_eq!(edge, Edge::new(HexCoord::new(0, 0), EdgeDirection::East));

        let corner = Intersection::new(HexCoord::new(0, 0), VertexDirection::North);
        let from_neighbor: Intersection =
            serde_json::from_str(r#"{"hex":{"q":1,"r":-1},"corner":"SouthWest"}"#).unwrap();
        assert_eq!(from_neighbor, corner);
    }
}
