//! Command-line interface components
//!
//! This module contains CLI-specific code for the GeoNorge Fetcher
//! application, including argument parsing, interactive order
//! configuration, and prompting primitives.

pub mod args;
pub mod commands;
pub mod interactive;
pub mod prompt;

pub use args::{Cli, Commands, GlobalArgs, OrderDownloadArgs};
pub use commands::{is_auth_relevant, run};
pub use prompt::{ConsoleReader, LineReader};
