use clap::Parser;
use maze_chase::autopilot::{Autopilot, Controller};
use maze_chase::config::SimulationConfig;
use maze_chase::error::ConfigError;
use maze_chase::runtime::{run_paced, ChannelController, RunExit};
use maze_chase::simulation::Simulation;
use maze_chase::telemetry::{emit_log, now_ms, LogLevel, LogScope};
use maze_chase::types::{
    AdversaryTag, CaptureState, CellKind, Difficulty, Direction, Empowerment, RuntimeEvent,
    Snapshot,
};
use serde_json::json;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};

#[derive(Parser, Debug)]
#[command(author, version, about = "Play the maze in the terminal")]
struct Cli {
    #[arg(long)]
    difficulty: Option<String>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    config: Option<PathBuf>,
    /// Let the built-in autopilot steer instead of reading stdin.
    #[arg(long)]
    autopilot: bool,
}

enum PlayController {
    Manual(ChannelController),
    Auto(Autopilot),
}

impl Controller for PlayController {
    fn next_input(&mut self, sim: &Simulation) -> Option<Direction> {
        match self {
            PlayController::Manual(inner) => inner.next_input(sim),
            PlayController::Auto(inner) => inner.next_input(sim),
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let seed = cli.seed.unwrap_or_else(now_ms);
    let run_id = format!("play-{seed}");

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(error) => {
            emit_log(
                LogLevel::Error,
                "config_invalid",
                &run_id,
                LogScope::default(),
                json!({ "error": error.to_string() }),
            );
            std::process::exit(2);
        }
    };

    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = cancel_tx.send(true);
        }
    });

    let mut controller = if cli.autopilot {
        PlayController::Auto(Autopilot::default())
    } else {
        let (input_tx, input_rx) = mpsc::channel(32);
        tokio::spawn(read_directions(input_tx));
        PlayController::Manual(ChannelController::new(input_rx))
    };

    let mut sim = Simulation::new(config.clone(), seed);
    emit_log(
        LogLevel::Info,
        "play_started",
        &run_id,
        LogScope::episode(0, seed),
        json!({ "autopilot": cli.autopilot, "config": config }),
    );
    println!("{}", render_frame(&sim.snapshot()));

    let exit = run_paced(&mut sim, &mut controller, cancel_rx, |sim, events| {
        println!("{}", render_frame(&sim.snapshot()));
        for event in events {
            log_event(&run_id, seed, sim.tick_count(), &event);
        }
    })
    .await;

    let summary = sim.build_summary();
    emit_log(
        LogLevel::Info,
        "play_finished",
        &run_id,
        LogScope::episode(0, seed).at_tick(sim.tick_count()),
        json!({
            "cancelled": exit == RunExit::Cancelled,
            "summary": summary,
        }),
    );
    match exit {
        RunExit::Cancelled => println!("cancelled after {} ticks", summary.ticks),
        RunExit::Finished(outcome) => println!(
            "{:?} with score {} after {} ticks",
            outcome, summary.score, summary.ticks
        ),
    }
}

fn resolve_config(cli: &Cli) -> Result<SimulationConfig, ConfigError> {
    let mut config = match cli.config.as_deref() {
        Some(path) => SimulationConfig::from_json_file(path)?,
        None => SimulationConfig::from_difficulty(
            cli.difficulty
                .as_deref()
                .and_then(Difficulty::parse)
                .unwrap_or(Difficulty::Medium),
        ),
    };
    config.apply_env_overrides()?;
    Ok(config)
}

async fn read_directions(tx: mpsc::Sender<Direction>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let Some(dir) = Direction::parse_move(&line) else {
            continue;
        };
        if tx.send(dir).await.is_err() {
            break;
        }
    }
}

fn log_event(run_id: &str, seed: u64, tick: u64, event: &RuntimeEvent) {
    let level = match event {
        RuntimeEvent::LifeLost { .. } | RuntimeEvent::EpisodeEnded { .. } => LogLevel::Warn,
        _ => LogLevel::Info,
    };
    let details = serde_json::to_value(event).unwrap_or_default();
    emit_log(
        level,
        "simulation_event",
        run_id,
        LogScope::episode(0, seed).at_tick(tick),
        details,
    );
}

fn render_frame(snapshot: &Snapshot) -> String {
    let mut rows: Vec<Vec<char>> = (0..snapshot.height)
        .map(|y| {
            (0..snapshot.width)
                .map(|x| match snapshot.cell(x, y) {
                    CellKind::Wall => '#',
                    CellKind::Pickup => '.',
                    CellKind::PowerPickup => 'o',
                    CellKind::Empty => ' ',
                })
                .collect()
        })
        .collect();

    for adversary in &snapshot.adversaries {
        let glyph = match (adversary.capture, adversary.fleeing) {
            (CaptureState::Captured(_), _) => '"',
            (CaptureState::Free, true) => 'm',
            (CaptureState::Free, false) => tag_glyph(adversary.tag),
        };
        rows[adversary.y as usize][adversary.x as usize] = glyph;
    }
    rows[snapshot.agent.y as usize][snapshot.agent.x as usize] = '@';

    let empowered = match snapshot.agent.empowerment {
        Empowerment::Active(remaining) => format!(" power {remaining}"),
        Empowerment::Inactive => String::new(),
    };
    let mut frame = format!(
        "tick {} score {} lives {} left {}{}\n",
        snapshot.tick,
        snapshot.agent.score,
        snapshot.agent.lives,
        snapshot.remaining_targets,
        empowered
    );
    for row in rows {
        frame.extend(row);
        frame.push('\n');
    }
    frame
}

fn tag_glyph(tag: AdversaryTag) -> char {
    match tag {
        AdversaryTag::Red => 'R',
        AdversaryTag::Pink => 'P',
        AdversaryTag::Cyan => 'C',
        AdversaryTag::Orange => 'O',
    }
}
