//! Client for the platform resource API and the plugin storage service.
//!
//! Single-resource reads go through a batched, deduplicating
//! [`ResourceLoader`](loader::ResourceLoader) whose cache is primed from every
//! response the client sees, including embedded `included` resources.
//! Storage operations are collected into a
//! [`StoragePipeline`](storage::StoragePipeline) and sent as one request.

pub mod cache;
pub mod config;
pub mod error;
pub mod loader;
pub mod logging;
pub mod platform;
pub mod resource;
pub mod storage;
pub mod transport;

pub use error::{ApiError, ApiResult};
pub use platform::{ClientOptions, ListQuery, PlatformClient};
