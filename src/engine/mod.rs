//! Test execution: splits the request volume across virtual users, drives
//! them concurrently against a [`RequestExecutor`], and summarizes the run.
mod executor;
mod plan;
mod scheduler;
mod source;
mod spec;
mod worker;


pub use executor::{FailureKind, RequestExecutor, RequestFailure, RequestOutcome};
pub use plan::{EngineConfig, Workload, partition_requests};
pub use scheduler::{execute, execute_until_shutdown};
pub use spec::RequestSpec;
