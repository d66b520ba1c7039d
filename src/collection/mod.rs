//! Request collections: ordered lists of requests loaded from JSON or TOML.
mod loader;
pub mod types;


pub use loader::{collection_from_str, load_collection};
pub use types::Collection;
