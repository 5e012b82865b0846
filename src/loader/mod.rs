//! Batched, deduplicating resource loader and the response absorber that
//! keeps its cache warm.

mod absorb;
mod batch;

pub use absorb::{absorb_document, ResponseAbsorber};
pub use batch::{LoaderConfig, LoaderStats, ResourceLoader};
