mod app;
mod collection;
mod config;
mod engine;
mod http;
mod validation;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppResult};
pub use collection::CollectionError;
pub use config::ConfigError;
pub use engine::EngineError;
pub use http::HttpError;
pub use validation::ValidationError;
