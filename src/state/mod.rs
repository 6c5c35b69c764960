//! Loading/error/data state around asynchronous work
//!
//! [`async_state::AsyncResource`] re-runs a producer when its dependencies
//! change; [`executor::AsyncExecutor`] runs one-shot operations on demand.

pub mod async_state;
pub mod executor;
