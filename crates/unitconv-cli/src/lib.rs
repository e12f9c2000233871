//! Library components of the `unitconv` command-line tool.

pub mod commands;
pub mod logging;
