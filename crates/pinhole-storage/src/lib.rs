//! Storage backends for short links.
//!
//! Both backends enforce code uniqueness themselves: the in-memory one
//! through the map's entry lock, the MySQL one through a unique index.

pub mod memory;
pub mod mysql;

pub use memory::InMemoryRepository;
pub use mysql::MySqlRepository;
pub use pinhole_core::repository::{ReadRepository, Repository, Result};
pub use pinhole_core::StorageError;
