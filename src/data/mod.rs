//! Views over caller-owned sequences
//!
//! Filtering, sorting and pagination never take ownership of the source;
//! they borrow it and hand back a view or a fresh copy.

pub mod filter;
pub mod pagination;
pub mod sort;
