//! Core library for the `rampart` CLI.
//!
//! The engine drives a staged population of virtual users through a scripted
//! CRUD workflow, records every exchange and check into a sharded metrics
//! aggregator, and judges the run against pass/fail thresholds. HTTP,
//! setup, and the workflow itself sit behind traits so the engine can run
//! against an in-process transport.
pub mod app;
pub mod args;
pub mod checks;
pub mod config;
pub mod entry;
pub mod error;
pub mod http;
mod logger;
pub mod metrics;
pub mod scenario;
pub mod scheduler;
pub mod shutdown;
mod shutdown_handlers;
pub mod thresholds;
pub mod vu;

#[cfg(feature = "fuzzing")]
pub mod fuzzing;
