use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::adversary::{Adversary, AdversaryStep};
use crate::agent::Agent;
use crate::collision;
use crate::config::SimulationConfig;
use crate::constants::{AdversarySpec, AGENT_SPAWN, CLASSIC_ROSTER};
use crate::grid::Grid;
use crate::types::{
    ConsumedKind, Direction, EpisodeSummary, Position, RuntimeEvent, Snapshot, TickOutcome,
};

#[derive(Clone, Debug, Default)]
struct EpisodeStats {
    pickups: u32,
    power_pickups: u32,
    captures: u32,
    lives_lost: u32,
}

#[derive(Clone, Debug)]
pub struct Simulation {
    config: SimulationConfig,
    seed: u64,
    rng: StdRng,
    grid: Grid,
    agent: Agent,
    adversaries: Vec<Adversary>,
    events: Vec<RuntimeEvent>,
    stats: EpisodeStats,
    tick_counter: u64,
    outcome: TickOutcome,
}

impl Simulation {
    pub fn new(config: SimulationConfig, seed: u64) -> Self {
        Self::with_layout(config, seed, Grid::classic(), AGENT_SPAWN, &CLASSIC_ROSTER)
    }

    pub fn with_layout(
        config: SimulationConfig,
        seed: u64,
        grid: Grid,
        agent_spawn: Position,
        roster: &[AdversarySpec],
    ) -> Self {
        let adversaries = roster
            .iter()
            .enumerate()
            .map(|(id, spec)| Adversary::from_spec(id, spec, config.adversary_update_frequency))
            .collect();
        Self {
            agent: Agent::new(agent_spawn, config.life_count),
            rng: StdRng::seed_from_u64(seed),
            seed,
            grid,
            adversaries,
            events: Vec::new(),
            stats: EpisodeStats::default(),
            tick_counter: 0,
            outcome: TickOutcome::Continue,
            config,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub fn adversaries(&self) -> &[Adversary] {
        &self.adversaries
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_counter
    }

    pub fn outcome(&self) -> TickOutcome {
        self.outcome
    }

    /// Advances one discrete step. Terminal outcomes are sticky: once `Lost`
    /// or `Won` is returned, later calls return it again without side effects.
    pub fn tick(&mut self, input: Option<Direction>) -> TickOutcome {
        if self.outcome.is_terminal() {
            return self.outcome;
        }
        self.tick_counter += 1;

        if let Some(dir) = input {
            self.agent.queue_direction(dir);
        }
        self.update_agent();
        self.update_adversaries();

        let report = collision::resolve(
            &mut self.agent,
            &mut self.adversaries,
            self.config.respawn_duration_ticks,
            &mut self.events,
        );
        self.stats.captures += report.captured.len() as u32;
        if report.life_lost {
            self.stats.lives_lost += 1;
        }

        self.check_terminal();
        self.outcome
    }

    fn update_agent(&mut self) {
        let step = self
            .agent
            .step(&mut self.grid, self.config.empowerment_duration_ticks);
        if let Some(kind) = step.consumed {
            let at = self.agent.position();
            match kind {
                ConsumedKind::Pickup => self.stats.pickups += 1,
                ConsumedKind::PowerPickup => self.stats.power_pickups += 1,
            }
            self.events.push(RuntimeEvent::PickupConsumed {
                x: at.x,
                y: at.y,
                kind,
            });
        }
        if step.empowerment_started {
            self.events.push(RuntimeEvent::EmpowermentStarted {
                ticks: self.config.empowerment_duration_ticks,
            });
        }
        if step.empowerment_ended {
            self.events.push(RuntimeEvent::EmpowermentEnded);
        }
    }

    fn update_adversaries(&mut self) {
        let agent_position = self.agent.position();
        let empowered = self.agent.is_empowered();
        for adversary in &mut self.adversaries {
            let step = adversary.step(&self.grid, agent_position, empowered, &mut self.rng);
            if step == AdversaryStep::Released {
                self.events.push(RuntimeEvent::AdversaryReleased {
                    adversary_id: adversary.id(),
                });
            }
        }
    }

    fn check_terminal(&mut self) {
        if self.agent.lives() == 0 {
            self.outcome = TickOutcome::Lost;
        } else if !self.grid.remaining_targets() {
            self.outcome = TickOutcome::Won;
        }
        if self.outcome.is_terminal() {
            self.events.push(RuntimeEvent::EpisodeEnded {
                outcome: self.outcome,
            });
        }
    }

    pub fn reset_episode(&mut self) {
        self.grid.reset();
        self.agent.reset(self.config.life_count);
        for adversary in &mut self.adversaries {
            adversary.reset();
        }
        self.rng = StdRng::seed_from_u64(self.seed);
        self.events.clear();
        self.stats = EpisodeStats::default();
        self.tick_counter = 0;
        self.outcome = TickOutcome::Continue;
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.tick_counter,
            width: self.grid.width(),
            height: self.grid.height(),
            cells: self.grid.cells().to_vec(),
            remaining_targets: self.grid.remaining_count(),
            agent: self.agent.view(),
            adversaries: self.adversaries.iter().map(|a| a.view()).collect(),
            outcome: self.outcome,
        }
    }

    pub fn drain_events(&mut self) -> Vec<RuntimeEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn build_summary(&self) -> EpisodeSummary {
        EpisodeSummary {
            outcome: self.outcome,
            ticks: self.tick_counter,
            score: self.agent.score(),
            lives_left: self.agent.lives(),
            pickups_consumed: self.stats.pickups,
            power_pickups_consumed: self.stats.power_pickups,
            adversaries_captured: self.stats.captures,
            lives_lost: self.stats.lives_lost,
            remaining_targets: self.grid.remaining_count(),
        }
    }

    #[cfg(test)]
    pub(crate) fn agent_mut(&mut self) -> &mut Agent {
        &mut self.agent
    }

    #[cfg(test)]
    pub(crate) fn adversaries_mut(&mut self) -> &mut [Adversary] {
        &mut self.adversaries
    }

    #[cfg(test)]
    pub(crate) fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }
}
