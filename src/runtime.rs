use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;

use crate::autopilot::Controller;
use crate::simulation::Simulation;
use crate::types::{Direction, RuntimeEvent, TickOutcome};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunExit {
    Cancelled,
    Finished(TickOutcome),
}

#[derive(Debug)]
pub struct ChannelController {
    rx: mpsc::Receiver<Direction>,
}

impl ChannelController {
    pub fn new(rx: mpsc::Receiver<Direction>) -> Self {
        Self { rx }
    }
}

impl Controller for ChannelController {
    fn next_input(&mut self, _sim: &Simulation) -> Option<Direction> {
        let mut latest = None;
        while let Ok(dir) = self.rx.try_recv() {
            latest = Some(dir);
        }
        latest
    }
}

/// Drives `sim` at its configured tick rate until the episode ends or
/// `cancel` turns true. Cancellation is only observed between ticks.
pub async fn run_paced<C, F>(
    sim: &mut Simulation,
    controller: &mut C,
    mut cancel: watch::Receiver<bool>,
    mut on_tick: F,
) -> RunExit
where
    C: Controller,
    F: FnMut(&Simulation, Vec<RuntimeEvent>),
{
    if sim.outcome().is_terminal() {
        return RunExit::Finished(sim.outcome());
    }

    let period = Duration::from_millis(sim.config().tick_duration_ms.max(1));
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut cancel_open = true;

    loop {
        if *cancel.borrow_and_update() {
            return RunExit::Cancelled;
        }

        tokio::select! {
            biased;
            changed = cancel.changed(), if cancel_open => {
                if changed.is_err() {
                    cancel_open = false;
                }
                continue;
            }
            _ = interval.tick() => {}
        }

        let input = controller.next_input(sim);
        let outcome = sim.tick(input);
        let events = sim.drain_events();
        on_tick(sim, events);
        if outcome.is_terminal() {
            return RunExit::Finished(outcome);
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::time::Instant;

    use super::*;
    use crate::config::SimulationConfig;
    use crate::grid::Grid;
    use crate::types::Position;

    fn config() -> SimulationConfig {
        SimulationConfig {
            tick_duration_ms: 50,
            ..SimulationConfig::default()
        }
    }

    fn short_episode() -> Simulation {
        Simulation::with_layout(
            config(),
            1,
            Grid::from_ascii(
                "######\n\
                 #o.._#\n\
                 ######",
            )
            .expect("valid layout"),
            Position::new(4, 1),
            &[],
        )
    }

    fn endless_episode() -> Simulation {
        Simulation::with_layout(
            config(),
            1,
            Grid::from_ascii(
                "#######\n\
                 #_____#\n\
                 #######\n\
                 #.#####\n\
                 #######",
            )
            .expect("valid layout"),
            Position::new(3, 1),
            &[],
        )
    }

    #[tokio::test(start_paused = true)]
    async fn runs_until_episode_finishes_at_configured_pace() {
        let mut sim = short_episode();
        let (_input_tx, input_rx) = mpsc::channel(8);
        let mut controller = ChannelController::new(input_rx);
        let (_cancel_tx, cancel_rx) = watch::channel(false);

        let started = Instant::now();
        let mut ticks = 0;
        let mut ended = false;
        let exit = run_paced(&mut sim, &mut controller, cancel_rx, |_, events| {
            ticks += 1;
            ended |= events
                .iter()
                .any(|event| matches!(event, RuntimeEvent::EpisodeEnded { .. }));
        })
        .await;

        assert_eq!(exit, RunExit::Finished(TickOutcome::Won));
        assert_eq!(ticks, 3);
        assert!(ended);
        assert!(started.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_cancel_sender_does_not_stop_the_loop() {
        let mut sim = short_episode();
        let (_input_tx, input_rx) = mpsc::channel(8);
        let mut controller = ChannelController::new(input_rx);
        let (cancel_tx, cancel_rx) = watch::channel(false);
        drop(cancel_tx);

        let exit = run_paced(&mut sim, &mut controller, cancel_rx, |_, _| {}).await;
        assert_eq!(exit, RunExit::Finished(TickOutcome::Won));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_before_start_runs_no_ticks() {
        let mut sim = endless_episode();
        let (_input_tx, input_rx) = mpsc::channel(8);
        let mut controller = ChannelController::new(input_rx);
        let (cancel_tx, cancel_rx) = watch::channel(false);
        cancel_tx.send(true).expect("receiver alive");

        let exit = run_paced(&mut sim, &mut controller, cancel_rx, |_, _| {}).await;
        assert_eq!(exit, RunExit::Cancelled);
        assert_eq!(sim.tick_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_an_endless_episode_between_ticks() {
        let mut sim = endless_episode();
        let (_input_tx, input_rx) = mpsc::channel(8);
        let mut controller = ChannelController::new(input_rx);
        let (cancel_tx, cancel_rx) = watch::channel(false);

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(220)).await;
            let _ = cancel_tx.send(true);
        });

        let exit = run_paced(&mut sim, &mut controller, cancel_rx, |_, _| {}).await;
        assert_eq!(exit, RunExit::Cancelled);
        assert!(sim.tick_count() >= 4);
        assert!(sim.tick_count() <= 6);
        assert_eq!(sim.outcome(), TickOutcome::Continue);
    }

    #[test]
    fn channel_controller_keeps_latest_direction() {
        let (tx, rx) = mpsc::channel(8);
        let mut controller = ChannelController::new(rx);
        let sim = endless_episode();
        tx.try_send(Direction::Up).expect("capacity");
        tx.try_send(Direction::Down).expect("capacity");
        tx.try_send(Direction::Right).expect("capacity");
        assert_eq!(controller.next_input(&sim), Some(Direction::Right));
        assert_eq!(controller.next_input(&sim), None);
    }
}
