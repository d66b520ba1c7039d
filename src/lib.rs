//! Core library for the `burden` CLI.
//!
//! The engine splits a fixed request volume across concurrent virtual users,
//! drives them against a pluggable [`engine::RequestExecutor`], and reduces
//! the outcomes to throughput, response time, latency, concurrency, peak load
//! and downtime figures. The HTTP executor, collection loader, CLI and
//! reporting around it make up the `burden` binary.
pub mod args;
pub mod collection;
pub mod config;
pub mod engine;
pub mod entry;
pub mod error;
pub mod http;
pub mod metrics;
pub mod report;
pub mod shutdown;
mod system;
