use crate::map::Grid;
use crate::types::{Position, MOVE_BATTERY_COST};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

#[derive(Clone, Eq, PartialEq)]
struct Node {
    position: Position,
    g_cost: u32,
    f_cost: u32,
}

// Min-heap on f_cost; ties fall back to heap order, which is deterministic
// for a fixed grid and fixed endpoints.
impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        other.f_cost.cmp(&self.f_cost)
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Shortest path from `start` to `goal` over the 4-connected grid, both
/// endpoints included. Returns a singleton when `start == goal` and an
/// empty vector when no route exists (or either endpoint is blocked).
pub fn find_path(grid: &Grid, start: Position, goal: Position) -> Vec<Position> {
    if !grid.is_traversable(start) || !grid.is_traversable(goal) {
        return Vec::new();
    }
    if start == goal {
        return vec![start];
    }

    let mut open_set = BinaryHeap::new();
    let mut came_from: HashMap<Position, Position> = HashMap::new();
    let mut g_score: HashMap<Position, u32> = HashMap::new();

    g_score.insert(start, 0);
    open_set.push(Node {
        position: start,
        g_cost: 0,
        f_cost: start.manhattan(goal) as u32,
    });

    while let Some(current) = open_set.pop() {
        let current_pos = current.position;

        if current_pos == goal {
            let mut path = vec![goal];
            let mut cursor = goal;
            while cursor != start {
                // Every reconstructed node was inserted with a predecessor.
                cursor = came_from[&cursor];
                path.push(cursor);
            }
            path.reverse();
            return path;
        }

        // Stale heap entry, a better route to this cell was already expanded.
        if current.g_cost > *g_score.get(&current_pos).unwrap_or(&u32::MAX) {
            continue;
        }

        for (neighbor, step_cost) in grid.neighbors(current_pos) {
            let tentative_g = current.g_cost + step_cost;
            if tentative_g < *g_score.get(&neighbor).unwrap_or(&u32::MAX) {
                came_from.insert(neighbor, current_pos);
                g_score.insert(neighbor, tentative_g);
                open_set.push(Node {
                    position: neighbor,
                    g_cost: tentative_g,
                    f_cost: tentative_g + neighbor.manhattan(goal) as u32,
                });
            }
        }
    }

    Vec::new()
}

/// Battery cost of walking a path: 2 points per step, 0 for an empty or
/// singleton path.
pub fn estimate_cost(path: &[Position]) -> f32 {
    if path.len() <= 1 {
        0.0
    } else {
        (path.len() - 1) as f32 * MOVE_BATTERY_COST
    }
}

/// Number of steps on the shortest route, `None` when unreachable.
pub fn route_len(grid: &Grid, from: Position, to: Position) -> Option<usize> {
    let path = find_path(grid, from, to);
    if path.is_empty() {
        None
    } else {
        Some(path.len() - 1)
    }
}

/// Battery cost of the shortest route, `f32::INFINITY` when no route
/// exists so that "cannot afford" propagates through comparisons.
pub fn route_cost(grid: &Grid, from: Position, to: Position) -> f32 {
    match route_len(grid, from, to) {
        Some(steps) => steps as f32 * MOVE_BATTERY_COST,
        None => f32::INFINITY,
    }
}
