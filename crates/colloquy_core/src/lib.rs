//! Core data types for the Colloquy conversation scripting library.
//!
//! This crate provides the host-neutral types shared by the conversation engine
//! and the host frameworks that drive it: outgoing messages, incoming activities,
//! and the persisted dialog state.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod activity;
mod message;
mod state;
mod telemetry;

pub use activity::{Activity, ActivityKind};
pub use message::{OutgoingMessage, QuickReply};
pub use state::{DialogState, EndStatus, Values, render_value};
pub use telemetry::{TelemetryConfig, init_telemetry, init_tracing, shutdown_telemetry};
