//! # Grid Search
//!
//! Breadth-first reachability helpers for the small tile grids used by the
//! dungeon and maze generators. Both flood fill and path checks are 4-neighbour.

use crate::game::Position;
use ::pathfinding::prelude::{bfs, bfs_reach};
use std::collections::HashSet;

/// Returns the in-bounds cardinal neighbours of a cell.
pub fn grid_neighbours(pos: Position, width: i32, height: i32) -> Vec<Position> {
    pos.cardinal_adjacent_positions()
        .into_iter()
        .filter(|p| p.x >= 0 && p.y >= 0 && p.x < width && p.y < height)
        .collect()
}

/// Collects every cell reachable from `start` through passable cells.
///
/// Returns an empty set when the start cell itself is out of bounds or blocked.
pub fn flood_fill<F>(width: i32, height: i32, start: Position, passable: F) -> HashSet<Position>
where
    F: Fn(Position) -> bool,
{
    let in_bounds = start.x >= 0 && start.y >= 0 && start.x < width && start.y < height;
    if !in_bounds || !passable(start) {
        return HashSet::new();
    }

    bfs_reach(start, |pos| {
        grid_neighbours(*pos, width, height)
            .into_iter()
            .filter(|n| passable(*n))
            .collect::<Vec<_>>()
    })
    .collect()
}

/// Checks that every open cell of the grid forms a single connected region.
///
/// The fill starts at the first open cell in row-major order. A grid with no
/// open cells at all is reported as not reachable.
///
/// # Examples
///
/// ```
/// use arcade_hub::{all_open_cells_reachable, Position};
///
/// // A wall column at x == 2 splits a 5x3 grid in two.
/// let split = all_open_cells_reachable(5, 3, |p: Position| p.x != 2);
/// assert!(!split);
///
/// let open = all_open_cells_reachable(5, 3, |_| true);
/// assert!(open);
/// ```
pub fn all_open_cells_reachable<F>(width: i32, height: i32, is_open: F) -> bool
where
    F: Fn(Position) -> bool,
{
    let open_cells: Vec<Position> = (0..height)
        .flat_map(|y| (0..width).map(move |x| Position::new(x, y)))
        .filter(|p| is_open(*p))
        .collect();

    let Some(start) = open_cells.first().copied() else {
        return false;
    };

    let reached = flood_fill(width, height, start, &is_open);
    open_cells.iter().all(|cell| reached.contains(cell))
}

/// Finds a shortest 4-neighbour path on a square grid, avoiding `walls`.
///
/// The returned path includes both `start` and `goal`.
pub fn shortest_path(
    size: i32,
    walls: &HashSet<Position>,
    start: Position,
    goal: Position,
) -> Option<Vec<Position>> {
    if walls.contains(&start) || walls.contains(&goal) {
        return None;
    }

    bfs(
        &start,
        |pos| {
            grid_neighbours(*pos, size, size)
                .into_iter()
                .filter(|n| !walls.contains(n))
                .collect::<Vec<_>>()
        },
        |pos| *pos == goal,
    )
}

/// Returns true if `goal` can be reached from `start` on a square grid.
pub fn has_path(size: i32, walls: &HashSet<Position>, start: Position, goal: Position) -> bool {
    shortest_path(size, walls, start, goal).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flood_fill_respects_blockers() {
        let reached = flood_fill(4, 4, Position::new(0, 0), |p| p.x < 2);
        assert_eq!(reached.len(), 8);
        assert!(!reached.contains(&Position::new(2, 0)));
    }

    #[test]
    fn test_flood_fill_blocked_start() {
        let reached = flood_fill(4, 4, Position::new(0, 0), |p| p.x > 0);
        assert!(reached.is_empty());
    }

    #[test]
    fn test_shortest_path_around_wall() {
        let walls: HashSet<Position> = [Position::new(1, 0), Position::new(1, 1)]
            .into_iter()
            .collect();
        let path = shortest_path(3, &walls, Position::new(0, 0), Position::new(2, 0)).unwrap();
        assert_eq!(path.first(), Some(&Position::new(0, 0)));
        assert_eq!(path.last(), Some(&Position::new(2, 0)));
        assert_eq!(path.len(), 7);
    }

    #[test]
    fn test_has_path_sealed_exit() {
        let walls: HashSet<Position> = [Position::new(1, 0), Position::new(0, 1)]
            .into_iter()
            .collect();
        assert!(!has_path(3, &walls, Position::new(2, 2), Position::new(0, 0)));
    }

    #[test]
    fn test_all_open_cells_reachable_empty_grid() {
        assert!(!all_open_cells_reachable(3, 3, |_| false));
    }
}
