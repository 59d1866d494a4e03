use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

use crate::grid::Grid;
use crate::types::{Position, Strategy};

pub fn search(strategy: Strategy, grid: &Grid, start: Position, goal: Position) -> Vec<Position> {
    match strategy {
        Strategy::Bfs => bfs(grid, start, goal),
        Strategy::Dfs => dfs(grid, start, goal),
        Strategy::BestFirst => best_first(grid, start, goal),
        Strategy::Random => Vec::new(),
    }
}

pub fn bfs(grid: &Grid, start: Position, goal: Position) -> Vec<Position> {
    let Some((start_idx, goal_idx)) = endpoints(grid, start, goal) else {
        return Vec::new();
    };
    let mut came_from: Vec<Option<usize>> = vec![None; grid.cell_count()];
    let mut visited = vec![false; grid.cell_count()];
    let mut queue = VecDeque::new();
    visited[start_idx] = true;
    queue.push_back(start_idx);

    while let Some(current) = queue.pop_front() {
        if current == goal_idx {
            return reconstruct(grid, &came_from, start_idx, goal_idx);
        }
        for next in grid.walkable_neighbors(grid.position_of(current)) {
            let Some(next_idx) = grid.index_of(next) else {
                continue;
            };
            if visited[next_idx] {
                continue;
            }
            visited[next_idx] = true;
            came_from[next_idx] = Some(current);
            queue.push_back(next_idx);
        }
    }
    Vec::new()
}

pub fn dfs(grid: &Grid, start: Position, goal: Position) -> Vec<Position> {
    let Some((start_idx, goal_idx)) = endpoints(grid, start, goal) else {
        return Vec::new();
    };
    let mut came_from: Vec<Option<usize>> = vec![None; grid.cell_count()];
    let mut visited = vec![false; grid.cell_count()];
    let mut stack = vec![start_idx];
    visited[start_idx] = true;

    while let Some(current) = stack.pop() {
        if current == goal_idx {
            return reconstruct(grid, &came_from, start_idx, goal_idx);
        }
        for next in grid.walkable_neighbors(grid.position_of(current)) {
            let Some(next_idx) = grid.index_of(next) else {
                continue;
            };
            if visited[next_idx] {
                continue;
            }
            visited[next_idx] = true;
            came_from[next_idx] = Some(current);
            stack.push(next_idx);
        }
    }
    Vec::new()
}

// Open-set ties on f pop in push order. Stale entries are skipped on pop.
pub fn best_first(grid: &Grid, start: Position, goal: Position) -> Vec<Position> {
    let Some((start_idx, goal_idx)) = endpoints(grid, start, goal) else {
        return Vec::new();
    };
    let mut came_from: Vec<Option<usize>> = vec![None; grid.cell_count()];
    let mut g_score = vec![u32::MAX; grid.cell_count()];
    let mut closed = vec![false; grid.cell_count()];
    let mut open = BinaryHeap::new();
    let mut sequence = 0u64;

    g_score[start_idx] = 0;
    open.push(Reverse((heuristic(start, goal), sequence, start_idx)));

    while let Some(Reverse((f, _, current))) = open.pop() {
        if closed[current] {
            continue;
        }
        let current_pos = grid.position_of(current);
        if f != g_score[current] + heuristic(current_pos, goal) {
            continue;
        }
        if current == goal_idx {
            return reconstruct(grid, &came_from, start_idx, goal_idx);
        }
        closed[current] = true;

        let tentative = g_score[current] + 1;
        for next in grid.walkable_neighbors(current_pos) {
            let Some(next_idx) = grid.index_of(next) else {
                continue;
            };
            if tentative >= g_score[next_idx] {
                continue;
            }
            came_from[next_idx] = Some(current);
            g_score[next_idx] = tentative;
            closed[next_idx] = false;
            sequence += 1;
            open.push(Reverse((tentative + heuristic(next, goal), sequence, next_idx)));
        }
    }
    Vec::new()
}

pub fn nearest<F>(grid: &Grid, start: Position, mut accept: F) -> Vec<Position>
where
    F: FnMut(Position) -> bool,
{
    let Some(start_idx) = grid.index_of(start) else {
        return Vec::new();
    };
    let mut came_from: Vec<Option<usize>> = vec![None; grid.cell_count()];
    let mut visited = vec![false; grid.cell_count()];
    let mut queue = VecDeque::new();
    visited[start_idx] = true;
    queue.push_back(start_idx);

    while let Some(current) = queue.pop_front() {
        let current_pos = grid.position_of(current);
        if current != start_idx && accept(current_pos) {
            return reconstruct(grid, &came_from, start_idx, current);
        }
        for next in grid.walkable_neighbors(current_pos) {
            let Some(next_idx) = grid.index_of(next) else {
                continue;
            };
            if visited[next_idx] {
                continue;
            }
            visited[next_idx] = true;
            came_from[next_idx] = Some(current);
            queue.push_back(next_idx);
        }
    }
    Vec::new()
}

fn heuristic(a: Position, b: Position) -> u32 {
    a.manhattan(b) as u32
}

fn endpoints(grid: &Grid, start: Position, goal: Position) -> Option<(usize, usize)> {
    if start == goal || !grid.is_walkable(start) || !grid.is_walkable(goal) {
        return None;
    }
    Some((grid.index_of(start)?, grid.index_of(goal)?))
}

fn reconstruct(
    grid: &Grid,
    came_from: &[Option<usize>],
    start_idx: usize,
    goal_idx: usize,
) -> Vec<Position> {
    let mut path = Vec::new();
    let mut current = goal_idx;
    while current != start_idx {
        path.push(grid.position_of(current));
        match came_from[current] {
            Some(prev) => current = prev,
            None => return Vec::new(),
        }
    }
    path.reverse();
    path
}
