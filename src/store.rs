//! Session stores

mod interface;
pub use interface::*;

pub mod memory;
pub mod mock;

#[cfg(feature = "sqlx_sqlite")]
pub mod sqlite;
