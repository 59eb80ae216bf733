//! Ironwall CLI library
//!
//! Exposes the argument model, command handlers, and output rendering so
//! the binary stays a thin dispatcher and integration tests can drive the
//! handlers directly.

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;
