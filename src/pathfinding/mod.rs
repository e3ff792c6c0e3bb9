use bevy::prelude::*;
use pathfinding::prelude::astar;

pub mod grid;

pub use grid::TileGrid;

/// Cost of one orthogonal step, in tenths of a tile.
const STEP_COST: u32 = 10;

/// Neighbour offsets in the order they are expanded: up, left, down, right.
const NEIGHBOR_OFFSETS: [IVec2; 4] = [
    IVec2::new(0, -1),
    IVec2::new(-1, 0),
    IVec2::new(0, 1),
    IVec2::new(1, 0),
];

/// A single cell of the passability map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tile {
    pub passable: bool,
}

impl Tile {
    pub const OPEN: Tile = Tile { passable: true };
    pub const BLOCKED: Tile = Tile { passable: false };
}

/// Passability map indexed `[row][col]`, i.e. y before x.
pub type TileMap = Vec<Vec<Tile>>;

/// Build a map from rows of passable flags
pub fn tile_map_from_rows(rows: &[Vec<bool>]) -> TileMap {
    rows.iter()
        .map(|row| row.iter().map(|&passable| Tile { passable }).collect())
        .collect()
}

/// Outcome of a path search. An unreachable goal is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AStarResult {
    pub has_path: bool,
    /// Tile coordinates from start to end, both included
    pub path: Vec<IVec2>,
}

impl AStarResult {
    fn unreachable() -> Self {
        Self::default()
    }
}

fn tile_at(map: &TileMap, location: IVec2) -> Option<Tile> {
    let row = usize::try_from(location.y).ok()?;
    let col = usize::try_from(location.x).ok()?;
    map.get(row)?.get(col).copied()
}

/// Whether an entity covering `footprint` tiles fits with its min corner at
/// `location`. Anything off the map counts as blocked.
pub fn is_reachable(location: IVec2, footprint: IVec2, map: &TileMap) -> bool {
    let footprint = footprint.max(IVec2::ONE);

    (0..footprint.y).all(|dy| {
        (0..footprint.x).all(|dx| {
            tile_at(map, location + IVec2::new(dx, dy)).is_some_and(|tile| tile.passable)
        })
    })
}

/// Orthogonal neighbours the footprint can move into.
pub fn neighbors(location: IVec2, footprint: IVec2, map: &TileMap) -> Vec<IVec2> {
    NEIGHBOR_OFFSETS
        .iter()
        .map(|offset| location + *offset)
        .filter(|next| is_reachable(*next, footprint, map))
        .collect()
}

fn straight_line_cost(from: IVec2, to: IVec2) -> u32 {
    (from.as_vec2().distance(to.as_vec2()) * STEP_COST as f32) as u32
}

/// Shortest 4-connected tile path for an entity of the given footprint.
///
/// Every call keeps its own frontier and back pointers.
pub fn find_path(start: IVec2, end: IVec2, footprint: IVec2, map: &TileMap) -> AStarResult {
    if !is_reachable(end, footprint, map) {
        debug!(
            "Path search: end ({}, {}) cannot hold a {}x{} footprint",
            end.x, end.y, footprint.x, footprint.y
        );
        return AStarResult::unreachable();
    }

    if start == end {
        return AStarResult {
            has_path: true,
            path: vec![start],
        };
    }

    let Some((path, cost)) = astar(
        &start,
        |location| {
            neighbors(*location, footprint, map)
                .into_iter()
                .map(|next| (next, STEP_COST))
        },
        |location| straight_line_cost(*location, end),
        |location| *location == end,
    ) else {
        debug!(
            "Path search: no route from ({}, {}) to ({}, {})",
            start.x, start.y, end.x, end.y
        );
        return AStarResult::unreachable();
    };

    debug!(
        "Path search: {} tiles from ({}, {}) to ({}, {}), cost {}",
        path.len(),
        start.x,
        start.y,
        end.x,
        end.y,
        cost
    );

    AStarResult {
        has_path: true,
        path,
    }
}
