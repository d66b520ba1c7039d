use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid run configuration: {reason}")]
    InvalidConfig { reason: &'static str },
    #[error("Request collection has no entries.")]
    EmptyCollection,
    #[error("Worker {worker} failed: {source}")]
    WorkerJoin {
        worker: usize,
        #[source]
        source: tokio::task::JoinError,
    },
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}
