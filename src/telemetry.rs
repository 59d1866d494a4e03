use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

#[derive(Clone, Debug, Serialize)]
pub struct StructuredLogLine {
    #[serde(rename = "timestampMs")]
    pub timestamp_ms: u64,
    pub level: LogLevel,
    pub event: String,
    #[serde(rename = "runId")]
    pub run_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick: Option<u64>,
    pub details: Value,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct LogScope {
    pub episode: Option<u32>,
    pub seed: Option<u64>,
    pub tick: Option<u64>,
}

impl LogScope {
    pub fn episode(episode: u32, seed: u64) -> Self {
        Self {
            episode: Some(episode),
            seed: Some(seed),
            tick: None,
        }
    }

    pub fn at_tick(self, tick: u64) -> Self {
        Self {
            tick: Some(tick),
            ..self
        }
    }
}

pub fn build_log_line(
    level: LogLevel,
    event: &str,
    run_id: &str,
    scope: LogScope,
    details: Value,
) -> StructuredLogLine {
    StructuredLogLine {
        timestamp_ms: now_ms(),
        level,
        event: event.to_string(),
        run_id: run_id.to_string(),
        episode: scope.episode,
        seed: scope.seed,
        tick: scope.tick,
        details,
    }
}

pub fn emit_log(level: LogLevel, event: &str, run_id: &str, scope: LogScope, details: Value) {
    let log_line = build_log_line(level, event, run_id, scope, details);
    match serde_json::to_string(&log_line) {
        Ok(text) => eprintln!("{text}"),
        Err(error) => eprintln!("[telemetry] failed to encode {event}: {error}"),
    }
}

pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn optional_scope_fields_are_omitted() {
        let line = build_log_line(
            LogLevel::Info,
            "run_started",
            "sim-1-2",
            LogScope::default(),
            json!({ "episodes": 3 }),
        );
        let value = serde_json::to_value(&line).expect("log line should serialize");
        assert_eq!(value["level"], "info");
        assert_eq!(value["runId"], "sim-1-2");
        assert_eq!(value["details"]["episodes"], 3);
        assert!(value.get("episode").is_none());
        assert!(value.get("seed").is_none());
        assert!(value.get("tick").is_none());
    }

    #[test]
    fn episode_scope_carries_seed_and_tick() {
        let line = build_log_line(
            LogLevel::Warn,
            "anomaly_detected",
            "run",
            LogScope::episode(2, 99).at_tick(40),
            Value::Null,
        );
        assert_eq!(line.episode, Some(2));
        assert_eq!(line.seed, Some(99));
        assert_eq!(line.tick, Some(40));
        assert!(line.timestamp_ms > 0);
    }

    #[test]
    fn rfc3339_timestamp_is_utc() {
        let stamp = now_rfc3339();
        assert!(stamp.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&stamp).is_ok());
    }
}
