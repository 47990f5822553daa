//! Foundation types for OVERWATCH.
//!
//! This crate contains the types shared by all OVERWATCH crates: the error
//! enum, the append-only transcript (typed log lines), the in-process event
//! bus, and runtime configuration.

pub mod config;
pub mod error;
pub mod event;
pub mod log;
