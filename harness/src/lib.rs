//! Quarry Harness: reference worlds and config-driven planning runs.
//!
//! The harness does NOT implement search logic; it delegates to
//! `quarry_search`. Worlds provide domain data only. The harness owns
//! configuration, instrumentation, logging setup and report digests.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod ledger;
pub mod logging;
pub mod runner;
pub mod worlds;
