pub mod adversary;
pub mod agent;
pub mod autopilot;
pub mod collision;
pub mod config;
pub mod constants;
pub mod error;
pub mod grid;
pub mod pathfinder;
pub mod runtime;
pub mod simulation;
pub mod telemetry;
pub mod types;
