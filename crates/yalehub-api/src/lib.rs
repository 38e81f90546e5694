// yalehub-api: Async Rust client for the Yale Connect cloud lock API

pub mod access;
pub mod auth;
pub mod client;
pub mod commands;
pub mod error;
pub mod locks;
pub mod models;
pub mod transport;

pub use access::AccessControl;
pub use client::{HomeContext, YaleClient};
pub use error::Error;
pub use locks::{LockRecord, merge_locks};
pub use models::{DoorLock, Endpoint, LockUnlockResult, ResponseStatus};
pub use transport::{Endpoints, TransportConfig};
