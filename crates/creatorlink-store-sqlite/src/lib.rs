//! SQLite backend for creatorlink.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. The same store doubles as the local
//! identity provider; photos live on disk in [`FsPhotoStore`].

mod encode;
mod identity;
mod photos;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use photos::FsPhotoStore;
pub use store::{DEFAULT_CODE_TTL_MINUTES, DEFAULT_SESSION_TTL_HOURS, SqliteStore};
