//! Ironwall daemon library.
//!
//! This library exposes internal modules for integration testing.
//! In production, `ironwall-daemon` is used as a binary (main.rs).

pub mod api;
pub mod bootstrap;
pub mod cli;
pub mod logging;
pub mod metrics_server;
