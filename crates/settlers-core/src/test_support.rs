//! Fixtures shared by the unit tests.

use crate::hex::{Edge, EdgeDirection, HexCoord, Intersection, VertexDirection};
use crate::setup::{BoardSetup, Harbor, Resource, Tile};

/// Seven land hexes inside a ring of ocean.
///
/// Center (0,0) lumber 8. Ring: (1,0) brick 6, (1,-1) wool 5, (0,-1) grain 9,
/// (-1,0) ore 10, (-1,1) desert with the robber, (0,1) gold 3.
/// A 3:1 harbor sits east of (1,0) and a 2:1 ore harbor west of (-1,0).
pub(crate) fn compact_setup() -> BoardSetup {
    let mut tiles = vec![
        (HexCoord::new(0, 0), Tile::resource(Resource::Lumber, 8)),
        (HexCoord::new(1, 0), Tile::resource(Resource::Brick, 6)),
        (HexCoord::new(1, -1), Tile::resource(Resource::Wool, 5)),
        (HexCoord::new(0, -1), Tile::resource(Resource::Grain, 9)),
        (HexCoord::new(-1, 0), Tile::resource(Resource::Ore, 10)),
        (HexCoord::new(-1, 1), Tile::desert()),
        (HexCoord::new(0, 1), Tile::gold(3)),
    ];
    let origin = HexCoord::new(0, 0);
    for q in -2..=2 {
        for r in -2..=2 {
            let coord = HexCoord::new(q, r);
            if origin.distance_to(&coord) == 2 {
                tiles.push((coord, Tile::ocean()));
            }
        }
    }
    BoardSetup::new(
        tiles,
        vec![
            (side(1, 0, EdgeDirection::East), Harbor::generic()),
            (side(-1, 0, EdgeDirection::West), Harbor::specific(Resource::Ore)),
        ],
        HexCoord::new(-1, 1),
    )
    .expect("compact layout is valid")
}

pub(crate) fn corner(q: i32, r: i32, corner: VertexDirection) -> Intersection {
    Intersection::new(HexCoord::new(q, r), corner)
}

pub(crate) fn side(q: i32, r: i32, direction: EdgeDirection) -> Edge {
    Edge::new(HexCoord::new(q, r), direction)
}
