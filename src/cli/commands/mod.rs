//! CLI command implementations

pub mod completions;
pub mod config;
pub mod create;
pub mod init;
pub mod list;
pub mod next;
pub mod show;
pub mod update;
