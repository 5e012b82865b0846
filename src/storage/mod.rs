//! Key/value storage service for an installed plugin.
//!
//! Commands are collected into a [`StoragePipeline`] and submitted as one
//! ordered request. A `None` result slot means either a miss (`get`/`unset`
//! on an absent key) or a failed uniqueness precondition; the service does
//! not tell the two apart.

mod command;
mod pipeline;

pub use command::{StorageCommand, StorageItem};
pub use pipeline::{StoragePipeline, STORAGE_PATH};
