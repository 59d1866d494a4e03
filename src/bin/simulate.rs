use clap::Parser;
use maze_chase::autopilot::{Autopilot, Controller};
use maze_chase::config::SimulationConfig;
use maze_chase::error::ConfigError;
use maze_chase::simulation::Simulation;
use maze_chase::telemetry::{emit_log, now_ms, now_rfc3339, LogLevel, LogScope};
use maze_chase::types::{
    CaptureState, CellKind, Difficulty, RuntimeEvent, Snapshot, TickOutcome,
};
use serde::Serialize;
use serde_json::json;
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

const DEFAULT_MAX_TICKS: u64 = 20_000;

#[derive(Parser, Debug)]
#[command(author, version, about = "Run headless autopilot episodes")]
struct Cli {
    #[arg(long)]
    difficulty: Option<String>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value_t = 1)]
    episodes: u32,
    #[arg(long, default_value_t = DEFAULT_MAX_TICKS)]
    max_ticks: u64,
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    run_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize)]
struct EpisodeResultLine {
    episode: u32,
    seed: u64,
    outcome: String,
    ticks: u64,
    score: u32,
    #[serde(rename = "livesLeft")]
    lives_left: u32,
    #[serde(rename = "pickupsConsumed")]
    pickups_consumed: u32,
    #[serde(rename = "powerPickupsConsumed")]
    power_pickups_consumed: u32,
    #[serde(rename = "adversariesCaptured")]
    adversaries_captured: u32,
    #[serde(rename = "livesLost")]
    lives_lost: u32,
    #[serde(rename = "remainingTargets")]
    remaining_targets: usize,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug)]
struct EpisodeRunResult {
    result: EpisodeResultLine,
    anomaly_records: Vec<AnomalyRecord>,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(rename = "startedAt")]
    started_at: String,
    #[serde(rename = "finishedAt")]
    finished_at: String,
    #[serde(rename = "durationMs")]
    duration_ms: u64,
    config: SimulationConfig,
    #[serde(rename = "episodeCount")]
    episode_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "averageScore")]
    average_score: u32,
    #[serde(rename = "averageTicks")]
    average_ticks: u64,
    #[serde(rename = "outcomeCounts")]
    outcome_counts: BTreeMap<String, usize>,
    episodes: Vec<EpisodeResultLine>,
}

fn main() {
    let cli = Cli::parse();
    let run_started_at_ms = now_ms();
    let started_at = now_rfc3339();
    let base_seed = cli.seed.unwrap_or(run_started_at_ms);
    let run_id = cli
        .run_id
        .clone()
        .unwrap_or_else(|| default_run_id(base_seed, run_started_at_ms));

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

    emit_log(
        LogLevel::Info,
        "run_started",
        &run_id,
        LogScope::default(),
        json!({
            "episodes": cli.episodes,
            "maxTicks": cli.max_ticks,
            "config": config,
        }),
    );

    let mut has_anomaly = false;
    let mut episode_results = Vec::new();
    let mut total_anomalies = 0usize;

    for episode in 0..cli.episodes {
        let seed = episode_seed(base_seed, episode);
        let scope = LogScope::episode(episode, seed);
        emit_log(LogLevel::Info, "episode_started", &run_id, scope, json!({}));

        let run = run_episode(&config, episode, seed, cli.max_ticks);
        for anomaly in &run.anomaly_records {
            emit_log(
                LogLevel::Warn,
                "anomaly_detected",
                &run_id,
                scope.at_tick(anomaly.tick),
                json!({ "message": anomaly.message }),
            );
        }
        if !run.result.anomalies.is_empty() {
            has_anomaly = true;
        }
        total_anomalies += run.anomaly_records.len();

        emit_log(
            LogLevel::Info,
            "episode_finished",
            &run_id,
            scope.at_tick(run.result.ticks),
            json!({
                "outcome": run.result.outcome,
                "score": run.result.score,
                "anomalyCount": run.anomaly_records.len(),
            }),
        );

        match serde_json::to_string(&run.result) {
            Ok(line) => println!("{line}"),
            Err(error) => emit_log(
                LogLevel::Error,
                "result_encode_failed",
                &run_id,
                scope,
                json!({ "error": error.to_string() }),
            ),
        }
        episode_results.push(run.result);
    }

    let summary = build_run_summary(
        run_id.clone(),
        started_at,
        now_rfc3339(),
        now_ms().saturating_sub(run_started_at_ms),
        config,
        episode_results,
        total_anomalies,
    );

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                LogLevel::Error,
                "summary_write_failed",
                &run_id,
                LogScope::default(),
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    emit_log(
        LogLevel::Info,
        "run_finished",
        &run_id,
        LogScope::default(),
        json!({
            "episodeCount": summary.episode_count,
            "anomalyCount": summary.anomaly_count,
            "averageScore": summary.average_score,
            "outcomeCounts": summary.outcome_counts,
            "summaryOut": summary_out_written,
        }),
    );

    if has_anomaly {
        std::process::exit(1);
    }
}

fn resolve_config(cli: &Cli) -> Result<SimulationConfig, ConfigError> {
    let mut config = match cli.config.as_deref() {
        Some(path) => SimulationConfig::from_json_file(path)?,
        None => {
            let difficulty = cli
                .difficulty
                .as_deref()
                .and_then(Difficulty::parse)
                .unwrap_or(Difficulty::Medium);
            SimulationConfig::from_difficulty(difficulty)
        }
    };
    config.apply_env_overrides()?;
    Ok(config)
}

fn run_episode(config: &SimulationConfig, episode: u32, seed: u64, max_ticks: u64) -> EpisodeRunResult {
    let mut sim = Simulation::new(config.clone(), seed);
    let mut pilot = Autopilot::default();
    let mut anomalies = Vec::new();
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();
    let mut previous = sim.snapshot();

    while !sim.outcome().is_terminal() && sim.tick_count() < max_ticks {
        let input = pilot.next_input(&sim);
        sim.tick(input);
        let events = sim.drain_events();
        let snapshot = sim.snapshot();
        for message in collect_snapshot_anomalies(config, &previous, &snapshot, &events) {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                snapshot.tick,
                message,
            );
        }
        previous = snapshot;
    }

    let summary = sim.build_summary();
    EpisodeRunResult {
        result: EpisodeResultLine {
            episode,
            seed,
            outcome: outcome_key(summary.outcome).to_string(),
            ticks: summary.ticks,
            score: summary.score,
            lives_left: summary.lives_left,
            pickups_consumed: summary.pickups_consumed,
            power_pickups_consumed: summary.power_pickups_consumed,
            adversaries_captured: summary.adversaries_captured,
            lives_lost: summary.lives_lost,
            remaining_targets: summary.remaining_targets,
            anomalies,
        },
        anomaly_records,
    }
}

fn collect_snapshot_anomalies(
    config: &SimulationConfig,
    previous: &Snapshot,
    snapshot: &Snapshot,
    events: &[RuntimeEvent],
) -> Vec<String> {
    let mut anomalies = Vec::new();
    let life_lost = events
        .iter()
        .any(|event| matches!(event, RuntimeEvent::LifeLost { .. }));

    if snapshot.agent.score < previous.agent.score {
        anomalies.push(format!(
            "score decreased: {} -> {}",
            previous.agent.score, snapshot.agent.score
        ));
    }
    if snapshot.remaining_targets > previous.remaining_targets {
        anomalies.push(format!(
            "remaining targets increased: {} -> {}",
            previous.remaining_targets, snapshot.remaining_targets
        ));
    }
    if snapshot.agent.lives > config.life_count {
        anomalies.push(format!("lives above configured count: {}", snapshot.agent.lives));
    }
    if snapshot.cell(snapshot.agent.x, snapshot.agent.y) == CellKind::Wall {
        anomalies.push(format!(
            "agent inside wall: ({}, {})",
            snapshot.agent.x, snapshot.agent.y
        ));
    }
    let agent_step =
        (snapshot.agent.x - previous.agent.x).abs() + (snapshot.agent.y - previous.agent.y).abs();
    if agent_step > 1 && !life_lost {
        anomalies.push(format!("agent moved {agent_step} cells in one tick"));
    }

    for adversary in &snapshot.adversaries {
        if snapshot.cell(adversary.x, adversary.y) == CellKind::Wall {
            anomalies.push(format!("adversary {} inside wall", adversary.id));
        }
        if let CaptureState::Captured(remaining) = adversary.capture {
            if remaining > config.respawn_duration_ticks {
                anomalies.push(format!(
                    "adversary {} respawn timer out of range: {remaining}",
                    adversary.id
                ));
            }
        }
    }
    anomalies
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    anomaly_records: &mut Vec<AnomalyRecord>,
    anomaly_seen: &mut HashSet<String>,
    tick: u64,
    message: String,
) {
    anomaly_records.push(AnomalyRecord {
        tick,
        message: message.clone(),
    });
    if anomaly_seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn episode_seed(base: u64, episode: u32) -> u64 {
    base.wrapping_add(episode as u64)
}

fn default_run_id(seed: u64, timestamp_ms: u64) -> String {
    format!("sim-{seed}-{timestamp_ms}")
}

fn outcome_key(outcome: TickOutcome) -> &'static str {
    match outcome {
        TickOutcome::Won => "won",
        TickOutcome::Lost => "lost",
        TickOutcome::Continue => "timeout",
    }
}

fn build_run_summary(
    run_id: String,
    started_at: String,
    finished_at: String,
    duration_ms: u64,
    config: SimulationConfig,
    episodes: Vec<EpisodeResultLine>,
    anomaly_count: usize,
) -> RunSummary {
    let episode_count = episodes.len();
    let mut outcome_counts: BTreeMap<String, usize> = BTreeMap::new();
    for episode in &episodes {
        *outcome_counts.entry(episode.outcome.clone()).or_insert(0) += 1;
    }
    let (average_score, average_ticks) = if episode_count == 0 {
        (0, 0)
    } else {
        let total_score: u64 = episodes.iter().map(|e| e.score as u64).sum();
        let total_ticks: u64 = episodes.iter().map(|e| e.ticks).sum();
        (
            (total_score / episode_count as u64) as u32,
            total_ticks / episode_count as u64,
        )
    };
    RunSummary {
        run_id,
        started_at,
        finished_at,
        duration_ms,
        config,
        episode_count,
        anomaly_count,
        average_score,
        average_ticks,
        outcome_counts,
        episodes,
    }
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
    std::fs::write(path, summary_text)
}
