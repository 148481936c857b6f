//! Error types for the Colloquy library.
//!
//! This crate provides the foundation error types used throughout the Colloquy ecosystem.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern for clean error handling:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use colloquy_error::{ColloquyResult, HostError, HostErrorKind};
//!
//! fn deliver() -> ColloquyResult<()> {
//!     Err(HostError::new(HostErrorKind::SendFailed("socket closed".to_string())))?
//! }
//!
//! match deliver() {
//!     Ok(()) => println!("Delivered"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod config;
mod error;
mod hook;
mod host;
mod json;
mod script;

pub use builder::{BuilderError, BuilderErrorKind};
pub use config::ConfigError;
pub use error::{ColloquyError, ColloquyErrorKind, ColloquyResult};
pub use hook::{HookError, HookErrorKind};
pub use host::{HostError, HostErrorKind};
pub use json::JsonError;
pub use script::{ScriptError, ScriptErrorKind};
