//! Library surface of the `pscope` binary: argument parsing, settings
//! file handling, the file-backed metadata store, and the command
//! implementations.

pub mod cli;
pub mod commands;
pub mod config;
pub mod store;
pub mod vault;
