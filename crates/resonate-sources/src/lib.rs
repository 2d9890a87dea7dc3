//! # resonate-sources
//!
//! Resolves a content identifier to playable audio by asking a prioritized
//! list of third-party lookup services, one after another, until one of them
//! answers with at least one usable audio stream.

pub mod adapters;
pub mod client;
pub mod config;
pub mod resolver;
pub mod types;

pub use adapters::{Extraction, SourceAdapter};
pub use client::{Fetch, FetchRequest, FetchResponse, HttpClient};
pub use config::{ResolverConfig, RetryPolicy, SourceConfig};
pub use resolver::StreamResolver;
pub use tokio_util::sync::CancellationToken;
