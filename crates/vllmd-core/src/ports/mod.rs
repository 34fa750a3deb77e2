//! Port definitions implemented by adapter crates.

pub mod hub;
