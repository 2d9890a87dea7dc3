//! # resonate-core
//!
//! Core types, normalization, and error handling for the Resonate stream resolver.

pub mod error;
pub mod lenient;
pub mod types;

pub use error::{Error, Result, TransportError};
pub use types::*;
