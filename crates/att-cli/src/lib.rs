//! Attendance CLI library.
//!
//! This crate provides the `att` command-line interface over the attendance
//! engine.

mod cli;
pub mod commands;
mod config;

pub use cli::{CallerArgs, Cli, Commands, OrgAction, StaffAction, SystemAction};
pub use config::Config;
