//! HTTP transport for the engine, built on a shared `reqwest` client.
mod client;
mod executor;


pub use client::{HttpSettings, build_client, parse_target_url};
pub use executor::HttpExecutor;
