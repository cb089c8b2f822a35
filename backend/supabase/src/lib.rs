//! HTTP implementations of the console's three external collaborators:
//! hosted tables, the media bucket, and password auth.

pub mod auth;
pub mod connection;
pub mod rest;
pub mod storage;

pub use auth::RestIdentity;
pub use connection::Connection;
pub use rest::RestRecordStore;
pub use storage::{RestStorage, DEFAULT_CACHE_CONTROL_SECS};
