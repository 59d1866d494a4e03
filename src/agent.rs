use crate::constants::{PICKUP_SCORE, POWER_PICKUP_SCORE};
use crate::grid::Grid;
use crate::types::{AgentView, ConsumedKind, Direction, Empowerment, Position};

const INITIAL_FACING: Direction = Direction::Left;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentStep {
    pub consumed: Option<ConsumedKind>,
    pub empowerment_started: bool,
    pub empowerment_ended: bool,
}

#[derive(Clone, Debug)]
pub struct Agent {
    position: Position,
    previous: Position,
    spawn: Position,
    facing: Direction,
    queued: Option<Direction>,
    score: u32,
    lives: u32,
    empowerment: Empowerment,
}

impl Agent {
    pub fn new(spawn: Position, lives: u32) -> Self {
        Self {
            position: spawn,
            previous: spawn,
            spawn,
            facing: INITIAL_FACING,
            queued: None,
            score: 0,
            lives,
            empowerment: Empowerment::Inactive,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn previous(&self) -> Position {
        self.previous
    }

    pub fn spawn(&self) -> Position {
        self.spawn
    }

    pub fn facing(&self) -> Direction {
        self.facing
    }

    pub fn queued(&self) -> Option<Direction> {
        self.queued
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn empowerment(&self) -> Empowerment {
        self.empowerment
    }

    pub fn is_empowered(&self) -> bool {
        matches!(self.empowerment, Empowerment::Active(_))
    }

    pub fn queue_direction(&mut self, dir: Direction) {
        self.queued = Some(dir);
    }

    pub fn step(&mut self, grid: &mut Grid, empowerment_ticks: u32) -> AgentStep {
        self.previous = self.position;

        // A queued turn is consumed whether or not it was open.
        if let Some(dir) = self.queued.take() {
            if grid.is_walkable(self.position.offset(dir)) {
                self.facing = dir;
            }
        }

        let mut step = AgentStep {
            consumed: None,
            empowerment_started: false,
            empowerment_ended: false,
        };

        let next = self.position.offset(self.facing);
        if grid.is_walkable(next) {
            self.position = next;
            step.consumed = grid.consume(next);
            match step.consumed {
                Some(ConsumedKind::Pickup) => self.score += PICKUP_SCORE,
                Some(ConsumedKind::PowerPickup) => {
                    self.score += POWER_PICKUP_SCORE;
                    if empowerment_ticks > 0 {
                        step.empowerment_started = !self.is_empowered();
                        self.empowerment = Empowerment::Active(empowerment_ticks);
                    }
                }
                None => {}
            }
        }

        if let Empowerment::Active(remaining) = self.empowerment {
            let remaining = remaining.saturating_sub(1);
            if remaining == 0 {
                self.empowerment = Empowerment::Inactive;
                step.empowerment_ended = true;
            } else {
                self.empowerment = Empowerment::Active(remaining);
            }
        }
        step
    }

    pub(crate) fn add_score(&mut self, amount: u32) {
        self.score += amount;
    }

    pub(crate) fn lose_life(&mut self) -> u32 {
        self.lives = self.lives.saturating_sub(1);
        self.lives
    }

    pub(crate) fn reset_to_spawn(&mut self) {
        self.position = self.spawn;
        self.previous = self.spawn;
    }

    pub(crate) fn reset(&mut self, lives: u32) {
        *self = Self::new(self.spawn, lives);
    }

    pub fn view(&self) -> AgentView {
        AgentView {
            x: self.position.x,
            y: self.position.y,
            dir: self.facing,
            score: self.score,
            lives: self.lives,
            empowerment: self.empowerment,
        }
    }

    #[cfg(test)]
    pub(crate) fn place(&mut self, position: Position, previous: Position) {
        self.position = position;
        self.previous = previous;
    }

    #[cfg(test)]
    pub(crate) fn set_facing(&mut self, facing: Direction) {
        self.facing = facing;
    }

    #[cfg(test)]
    pub(crate) fn set_empowerment(&mut self, empowerment: Empowerment) {
        self.empowerment = empowerment;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CellKind;

    fn corridor() -> Grid {
        Grid::from_ascii(
            "#######\n\
             #_.o._#\n\
             #_#####\n\
             #######",
        )
        .expect("valid layout")
    }

    #[test]
    fn moves_in_facing_and_scores_pickups() {
        let mut grid = corridor();
        let mut agent = Agent::new(Position::new(1, 1), 3);
        agent.set_facing(Direction::Right);

        let step = agent.step(&mut grid, 5);
        assert_eq!(agent.position(), Position::new(2, 1));
        assert_eq!(agent.previous(), Position::new(1, 1));
        assert_eq!(step.consumed, Some(ConsumedKind::Pickup));
        assert_eq!(agent.score(), 10);

        let step = agent.step(&mut grid, 5);
        assert_eq!(step.consumed, Some(ConsumedKind::PowerPickup));
        assert!(step.empowerment_started);
        assert_eq!(agent.score(), 60);
        assert_eq!(agent.empowerment(), Empowerment::Active(4));
        assert_eq!(grid.cell_kind(Position::new(3, 1)), CellKind::Empty);
    }

    #[test]
    fn blocked_agent_stays_put() {
        let mut grid = corridor();
        let mut agent = Agent::new(Position::new(1, 1), 3);
        agent.set_facing(Direction::Up);
        let step = agent.step(&mut grid, 5);
        assert_eq!(agent.position(), Position::new(1, 1));
        assert_eq!(step.consumed, None);
        assert_eq!(agent.score(), 0);
    }

    #[test]
    fn queued_turn_applies_only_when_open_and_is_discarded() {
        let mut grid = corridor();
        let mut agent = Agent::new(Position::new(1, 1), 3);
        agent.set_facing(Direction::Right);

        agent.queue_direction(Direction::Up);
        agent.step(&mut grid, 5);
        assert_eq!(agent.facing(), Direction::Right);
        assert_eq!(agent.position(), Position::new(2, 1));
        assert_eq!(agent.queued(), None);

        agent.place(Position::new(1, 1), Position::new(1, 1));
        agent.queue_direction(Direction::Down);
        agent.step(&mut grid, 5);
        assert_eq!(agent.facing(), Direction::Down);
        assert_eq!(agent.position(), Position::new(1, 2));
    }

    #[test]
    fn empowerment_lasts_exactly_configured_ticks() {
        let mut grid = Grid::from_ascii(
            "########\n\
             #_o____#\n\
             ########",
        )
        .expect("valid layout");
        let mut agent = Agent::new(Position::new(1, 1), 3);
        agent.set_facing(Direction::Right);

        let mut empowered_ticks = 0;
        let mut ended = false;
        for _ in 0..6 {
            let step = agent.step(&mut grid, 3);
            if agent.is_empowered() || step.empowerment_ended {
                empowered_ticks += 1;
            }
            ended |= step.empowerment_ended;
        }
        assert_eq!(empowered_ticks, 3);
        assert!(ended);
        assert_eq!(agent.empowerment(), Empowerment::Inactive);
    }

    #[test]
    fn second_power_pickup_refreshes_timer() {
        let mut grid = Grid::from_ascii(
            "######\n\
             #_oo_#\n\
             ######",
        )
        .expect("valid layout");
        let mut agent = Agent::new(Position::new(1, 1), 3);
        agent.set_facing(Direction::Right);
        agent.step(&mut grid, 10);
        assert_eq!(agent.empowerment(), Empowerment::Active(9));
        let step = agent.step(&mut grid, 10);
        assert!(!step.empowerment_started);
        assert_eq!(agent.empowerment(), Empowerment::Active(9));
        assert_eq!(agent.score(), 100);
    }

    #[test]
    fn reset_to_spawn_keeps_heading_and_queued_turn() {
        let mut agent = Agent::new(Position::new(1, 1), 2);
        agent.place(Position::new(4, 1), Position::new(3, 1));
        agent.set_facing(Direction::Right);
        agent.queue_direction(Direction::Up);
        assert_eq!(agent.lose_life(), 1);
        agent.reset_to_spawn();
        assert_eq!(agent.position(), Position::new(1, 1));
        assert_eq!(agent.previous(), Position::new(1, 1));
        assert_eq!(agent.facing(), Direction::Right);
        assert_eq!(agent.queued(), Some(Direction::Up));
        assert_eq!(agent.lose_life(), 0);
        assert_eq!(agent.lose_life(), 0);
    }
}
