//! In-process record storage

mod memory;

pub use memory::{InMemoryRepository, InMemoryRepositoryProvider};
