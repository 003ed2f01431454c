//! # dbtransfer Shared
//!
//! Common types used across the transfer workflow crates.

pub mod archive;
pub mod config;
pub mod error;
pub mod outcome;
pub mod reporter;

// Re-exports
pub use archive::*;
pub use config::*;
pub use error::*;
pub use outcome::*;
pub use reporter::*;
