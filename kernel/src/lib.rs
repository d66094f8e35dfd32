//! Quarry Kernel: the contracts and shared resources of the Quarry planner.
//!
//! # API Surface
//!
//! - [`contract`] -- the collaborator traits the planner consumes
//!   ([`contract::Agent`], [`contract::Goal`], [`contract::Action`])
//! - [`pool`] -- the process-wide reusable-object pool
//! - [`digest`] -- domain-separated SHA-256 content digests
//!
//! The kernel depends on nothing internal. `quarry-search` builds the
//! planner on top of it.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod contract;
pub mod digest;
pub mod pool;
