use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;

use crate::constants::AdversarySpec;
use crate::grid::Grid;
use crate::pathfinder;
use crate::types::{AdversaryTag, AdversaryView, CaptureState, Direction, Position, Strategy};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdversaryStep {
    Pinned,
    Released,
    FollowedPath,
    Wandered,
    Stuck,
}

#[derive(Clone, Debug)]
pub struct Adversary {
    id: usize,
    tag: AdversaryTag,
    strategy: Strategy,
    position: Position,
    previous: Position,
    spawn: Position,
    home: Position,
    facing: Direction,
    capture: CaptureState,
    fleeing: bool,
    target: Option<Position>,
    path: VecDeque<Position>,
    replan_counter: u32,
    update_frequency: u32,
}

impl Adversary {
    pub fn new(
        id: usize,
        tag: AdversaryTag,
        strategy: Strategy,
        spawn: Position,
        update_frequency: u32,
    ) -> Self {
        Self {
            id,
            tag,
            strategy,
            position: spawn,
            previous: spawn,
            spawn,
            home: spawn,
            facing: Direction::Up,
            capture: CaptureState::Free,
            fleeing: false,
            target: None,
            path: VecDeque::new(),
            replan_counter: 0,
            update_frequency: update_frequency.max(1),
        }
    }

    pub fn from_spec(id: usize, spec: &AdversarySpec, update_frequency: u32) -> Self {
        let mut adversary = Self::new(id, spec.tag, spec.strategy, spec.spawn, update_frequency);
        adversary.home = spec.home;
        adversary
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn tag(&self) -> AdversaryTag {
        self.tag
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
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

    pub fn home(&self) -> Position {
        self.home
    }

    pub fn facing(&self) -> Direction {
        self.facing
    }

    pub fn capture_state(&self) -> CaptureState {
        self.capture
    }

    pub fn is_free(&self) -> bool {
        self.capture == CaptureState::Free
    }

    pub fn is_fleeing(&self) -> bool {
        self.fleeing
    }

    pub fn target(&self) -> Option<Position> {
        self.target
    }

    pub fn planned_path(&self) -> impl Iterator<Item = &Position> {
        self.path.iter()
    }

    pub fn update_frequency(&self) -> u32 {
        self.update_frequency
    }

    pub fn select_target(&self, grid: &Grid, agent: Position, fleeing: bool) -> Position {
        if !fleeing {
            return agent;
        }
        let mut best = agent;
        let mut best_distance = -1;
        for cell in grid.walkable_cells() {
            let distance = cell.manhattan(agent);
            if distance > best_distance {
                best_distance = distance;
                best = cell;
            }
        }
        best
    }

    pub fn step(
        &mut self,
        grid: &Grid,
        agent: Position,
        agent_empowered: bool,
        rng: &mut StdRng,
    ) -> AdversaryStep {
        self.previous = self.position;

        if let CaptureState::Captured(remaining) = self.capture {
            let remaining = remaining.saturating_sub(1);
            if remaining == 0 {
                self.capture = CaptureState::Free;
                return AdversaryStep::Released;
            }
            self.capture = CaptureState::Captured(remaining);
            return AdversaryStep::Pinned;
        }

        self.fleeing = agent_empowered;

        if self.strategy != Strategy::Random {
            self.replan_counter += 1;
            if self.replan_counter >= self.update_frequency || self.path.is_empty() {
                self.replan(grid, agent);
            }
        }

        if let Some(next) = self.path.pop_front() {
            self.move_to(next);
            return AdversaryStep::FollowedPath;
        }

        let options: Vec<Position> = grid.walkable_neighbors(self.position).collect();
        match options.choose(rng) {
            Some(next) => {
                self.move_to(*next);
                AdversaryStep::Wandered
            }
            None => AdversaryStep::Stuck,
        }
    }

    pub fn set_target(&mut self, grid: &Grid, agent: Position) -> Position {
        let target = self.select_target(grid, agent, self.fleeing);
        self.target = Some(target);
        target
    }

    fn replan(&mut self, grid: &Grid, agent: Position) {
        self.replan_counter = 0;
        let target = self.set_target(grid, agent);
        self.path = pathfinder::search(self.strategy, grid, self.position, target).into();
    }

    fn move_to(&mut self, next: Position) {
        if let Some(dir) = Direction::between(self.position, next) {
            self.facing = dir;
        }
        self.position = next;
    }

    pub(crate) fn capture(&mut self, respawn_ticks: u32) {
        self.position = self.home;
        self.previous = self.home;
        self.path.clear();
        self.target = None;
        self.replan_counter = 0;
        self.fleeing = false;
        self.capture = if respawn_ticks == 0 {
            CaptureState::Free
        } else {
            CaptureState::Captured(respawn_ticks)
        };
    }

    pub(crate) fn return_home(&mut self) {
        self.position = self.home;
        self.previous = self.home;
        self.path.clear();
        self.target = None;
        self.replan_counter = 0;
    }

    pub(crate) fn reset(&mut self) {
        let home = self.home;
        *self = Self::new(
            self.id,
            self.tag,
            self.strategy,
            self.spawn,
            self.update_frequency,
        );
        self.home = home;
    }

    pub fn view(&self) -> AdversaryView {
        AdversaryView {
            id: self.id,
            tag: self.tag,
            x: self.position.x,
            y: self.position.y,
            dir: self.facing,
            strategy: self.strategy,
            capture: self.capture,
            fleeing: self.fleeing && self.is_free(),
        }
    }

    #[cfg(test)]
    pub(crate) fn place(&mut self, position: Position, previous: Position) {
        self.position = position;
        self.previous = previous;
        self.path.clear();
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    fn open_room() -> Grid {
        Grid::from_ascii(
            "#######\n\
             #_____#\n\
             #_____#\n\
             #_____#\n\
             #######",
        )
        .expect("valid layout")
    }

    #[test]
    fn chasing_target_is_agent_and_flee_target_is_farthest_first_in_scan_order() {
        let grid = open_room();
        let adversary = Adversary::new(0, AdversaryTag::Red, Strategy::Bfs, Position::new(3, 2), 3);
        let agent = Position::new(1, 1);
        assert_eq!(adversary.select_target(&grid, agent, false), agent);
        assert_eq!(
            adversary.select_target(&grid, agent, true),
            Position::new(5, 3)
        );

        let centre = Position::new(3, 2);
        assert_eq!(
            adversary.select_target(&grid, centre, true),
            Position::new(1, 1)
        );
    }

    #[test]
    fn replans_on_empty_path_then_follows_it() {
        let grid = open_room();
        let mut rng = StdRng::seed_from_u64(7);
        let mut adversary =
            Adversary::new(0, AdversaryTag::Pink, Strategy::Bfs, Position::new(1, 1), 10);
        let agent = Position::new(5, 1);

        assert_eq!(
            adversary.step(&grid, agent, false, &mut rng),
            AdversaryStep::FollowedPath
        );
        assert_eq!(adversary.position(), Position::new(2, 1));
        assert_eq!(adversary.previous(), Position::new(1, 1));
        assert_eq!(adversary.facing(), Direction::Right);
        assert_eq!(adversary.target(), Some(agent));
        assert_eq!(adversary.planned_path().count(), 3);

        adversary.step(&grid, Position::new(5, 3), false, &mut rng);
        assert_eq!(adversary.position(), Position::new(3, 1));
        assert_eq!(adversary.target(), Some(agent));
    }

    #[test]
    fn replans_when_counter_reaches_frequency() {
        let grid = open_room();
        let mut rng = StdRng::seed_from_u64(7);
        let mut adversary =
            Adversary::new(0, AdversaryTag::Red, Strategy::BestFirst, Position::new(1, 1), 2);
        adversary.step(&grid, Position::new(5, 1), false, &mut rng);
        assert_eq!(adversary.target(), Some(Position::new(5, 1)));

        adversary.step(&grid, Position::new(1, 3), false, &mut rng);
        assert_eq!(adversary.target(), Some(Position::new(5, 1)));
        assert_eq!(adversary.position(), Position::new(3, 1));

        adversary.step(&grid, Position::new(1, 3), false, &mut rng);
        assert_eq!(adversary.target(), Some(Position::new(1, 3)));
        assert_eq!(adversary.position().manhattan(Position::new(3, 1)), 1);
        assert_eq!(adversary.position().manhattan(Position::new(1, 3)), 3);
        assert_eq!(adversary.planned_path().count(), 3);
    }

    #[test]
    fn random_strategy_never_plans_and_moves_to_a_neighbour() {
        let grid = open_room();
        let mut rng = StdRng::seed_from_u64(99);
        let mut adversary =
            Adversary::new(3, AdversaryTag::Orange, Strategy::Random, Position::new(3, 2), 1);
        for _ in 0..20 {
            let before = adversary.position();
            assert_eq!(
                adversary.step(&grid, Position::new(1, 1), false, &mut rng),
                AdversaryStep::Wandered
            );
            assert_eq!(before.manhattan(adversary.position()), 1);
            assert!(grid.is_walkable(adversary.position()));
            assert_eq!(adversary.target(), None);
        }
    }

    #[test]
    fn wanders_when_target_is_unreachable() {
        let grid = Grid::from_ascii(
            "######\n\
             #__#_#\n\
             ######",
        )
        .expect("valid layout");
        let mut rng = StdRng::seed_from_u64(1);
        let mut adversary =
            Adversary::new(0, AdversaryTag::Red, Strategy::Bfs, Position::new(1, 1), 3);
        let step = adversary.step(&grid, Position::new(4, 1), false, &mut rng);
        assert_eq!(step, AdversaryStep::Wandered);
        assert_eq!(adversary.position(), Position::new(2, 1));
    }

    #[test]
    fn isolated_adversary_is_stuck() {
        let grid = Grid::from_ascii(
            "###\n\
             #_#\n\
             ###",
        )
        .expect("valid layout");
        let mut rng = StdRng::seed_from_u64(1);
        let mut adversary =
            Adversary::new(0, AdversaryTag::Red, Strategy::Dfs, Position::new(1, 1), 3);
        assert_eq!(
            adversary.step(&grid, Position::new(1, 1), false, &mut rng),
            AdversaryStep::Stuck
        );
        assert_eq!(adversary.position(), Position::new(1, 1));
    }

    #[test]
    fn captured_adversary_is_pinned_until_timer_expires() {
        let grid = open_room();
        let mut rng = StdRng::seed_from_u64(3);
        let spawn = Position::new(3, 2);
        let mut adversary = Adversary::new(0, AdversaryTag::Cyan, Strategy::Bfs, spawn, 3);
        adversary.place(Position::new(5, 3), Position::new(5, 2));

        adversary.capture(3);
        assert_eq!(adversary.position(), spawn);
        assert_eq!(adversary.capture_state(), CaptureState::Captured(3));

        assert_eq!(
            adversary.step(&grid, Position::new(1, 1), true, &mut rng),
            AdversaryStep::Pinned
        );
        assert_eq!(
            adversary.step(&grid, Position::new(1, 1), true, &mut rng),
            AdversaryStep::Pinned
        );
        assert_eq!(adversary.position(), spawn);
        assert!(!adversary.is_free());
        assert_eq!(
            adversary.step(&grid, Position::new(1, 1), true, &mut rng),
            AdversaryStep::Released
        );
        assert!(adversary.is_free());
        assert_eq!(adversary.position(), spawn);
        assert_eq!(adversary.target(), None);
    }

    #[test]
    fn fleeing_adversary_heads_away_from_agent() {
        let grid = open_room();
        let mut rng = StdRng::seed_from_u64(3);
        let mut adversary =
            Adversary::new(0, AdversaryTag::Red, Strategy::BestFirst, Position::new(3, 2), 5);
        adversary.step(&grid, Position::new(1, 1), true, &mut rng);
        assert!(adversary.is_fleeing());
        assert_eq!(adversary.target(), Some(Position::new(5, 3)));
        assert!(adversary.position().manhattan(Position::new(5, 3)) == 2);
    }

    #[test]
    fn capture_uses_home_and_reset_uses_starting_cell() {
        let spec = AdversarySpec {
            tag: AdversaryTag::Pink,
            strategy: Strategy::Bfs,
            spawn: Position::new(1, 1),
            home: Position::new(3, 2),
        };
        let mut adversary = Adversary::from_spec(1, &spec, 4);
        assert_eq!(adversary.position(), Position::new(1, 1));
        assert_eq!(adversary.home(), Position::new(3, 2));

        adversary.capture(2);
        assert_eq!(adversary.position(), Position::new(3, 2));
        assert_eq!(adversary.previous(), Position::new(3, 2));

        adversary.reset();
        assert_eq!(adversary.position(), Position::new(1, 1));
        assert_eq!(adversary.home(), Position::new(3, 2));
        assert!(adversary.is_free());

        adversary.place(Position::new(5, 3), Position::new(5, 2));
        adversary.return_home();
        assert_eq!(adversary.position(), Position::new(3, 2));
    }
}
