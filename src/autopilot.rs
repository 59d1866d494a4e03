use crate::pathfinder;
use crate::simulation::Simulation;
use crate::types::{CellKind, Direction, Position};

pub const DEFAULT_DANGER_RADIUS: i32 = 2;

pub trait Controller {
    fn next_input(&mut self, sim: &Simulation) -> Option<Direction>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    Chase,
    Escape,
    Collect,
    Idle,
}

#[derive(Clone, Debug)]
pub struct Autopilot {
    danger_radius: i32,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self::new(DEFAULT_DANGER_RADIUS)
    }
}

impl Autopilot {
    pub fn new(danger_radius: i32) -> Self {
        Self {
            danger_radius: danger_radius.max(0),
        }
    }

    pub fn decide(&self, sim: &Simulation) -> (Intent, Option<Direction>) {
        let agent = sim.agent();
        let here = agent.position();
        let threats: Vec<Position> = sim
            .adversaries()
            .iter()
            .filter(|adversary| adversary.is_free())
            .map(|adversary| adversary.position())
            .collect();

        if agent.is_empowered() {
            let path = pathfinder::nearest(sim.grid(), here, |pos| threats.contains(&pos));
            if let Some(dir) = first_step(here, &path) {
                return (Intent::Chase, Some(dir));
            }
        } else if nearest_distance(here, &threats).is_some_and(|d| d <= self.danger_radius) {
            if let Some(dir) = self.escape_direction(sim, &threats) {
                return (Intent::Escape, Some(dir));
            }
        }

        let grid = sim.grid();
        let path = pathfinder::nearest(grid, here, |pos| {
            matches!(grid.cell_kind(pos), CellKind::Pickup | CellKind::PowerPickup)
        });
        match first_step(here, &path) {
            Some(dir) => (Intent::Collect, Some(dir)),
            None => (Intent::Idle, None),
        }
    }

    fn escape_direction(&self, sim: &Simulation, threats: &[Position]) -> Option<Direction> {
        let here = sim.agent().position();
        let mut best = None;
        let mut best_distance = i32::MIN;
        for dir in Direction::ALL {
            let next = here.offset(dir);
            if !sim.grid().is_walkable(next) {
                continue;
            }
            let distance = nearest_distance(next, threats).unwrap_or(i32::MAX);
            if distance > best_distance {
                best_distance = distance;
                best = Some(dir);
            }
        }
        best
    }
}

impl Controller for Autopilot {
    fn next_input(&mut self, sim: &Simulation) -> Option<Direction> {
        self.decide(sim).1
    }
}

fn nearest_distance(from: Position, others: &[Position]) -> Option<i32> {
    others.iter().map(|other| from.manhattan(*other)).min()
}

fn first_step(from: Position, path: &[Position]) -> Option<Direction> {
    path.first().and_then(|next| Direction::between(from, *next))
}
