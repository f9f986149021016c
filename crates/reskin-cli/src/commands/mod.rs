//! CLI commands

pub mod resolve;
pub mod skin;
