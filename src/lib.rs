//! Weapon Uptime Calculator — library entry point.
//!
//! Exposes config, model, uptime, sim, advisory, compare, and report
//! for use by the CLI and tests.

pub mod advisory;
pub mod compare;
pub mod config;
pub mod model;
pub mod report;
pub mod sim;
pub mod uptime;
pub mod util;
