// src/lib.rs

#[macro_use]
pub mod macros;

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod file;
pub mod keys;
pub mod log;
pub mod matcher;
pub mod merge;
pub mod progress;
pub mod table;
pub mod wiki;
