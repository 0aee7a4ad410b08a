//! CLI module for CarryLink

pub mod app;
pub mod commands;

pub use app::{render_package, render_summary, CarryLinkApp};
pub use commands::{Cli, Commands};
