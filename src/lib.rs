//! KeyRunner firmware library.
//!
//! Exposes the pure-logic modules for integration testing.  All
//! ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module.

#![deny(unused_must_use)]

pub mod adjustment;
pub mod app;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod reporter;
pub mod safety;
pub mod sequencer;

pub mod adapters;
pub mod drivers;
pub mod pins;
