//! Utility functions and helpers
//!
//! Paths, clocks and logging shared by the hooks and the binary.

pub mod app_paths;
pub mod clock;
pub mod logging;
