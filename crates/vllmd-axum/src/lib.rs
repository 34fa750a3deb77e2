//! Axum web adapter for vllmd.
//!
//! Routes, handlers, error mapping, and the composition root that wires the
//! supervisor and hub client together.

pub mod bootstrap;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use bootstrap::{bootstrap, AppContext};
pub use routes::create_router;
pub use state::AppState;
