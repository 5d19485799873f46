//! Infrastructure layer - external concerns

pub mod remote;
pub mod storage;

pub use remote::{HttpExecutor, StaticAddressResolver};
pub use storage::{InMemoryRepository, InMemoryRepositoryProvider};
