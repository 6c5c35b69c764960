//! Configuration module
//!
//! Defaults for the hooks and the catalog binary, stored as TOML.

pub mod config;
