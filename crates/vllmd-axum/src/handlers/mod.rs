//! Request handlers. Thin: validate, delegate to state, wrap the envelope.

pub mod hf;
pub mod serve;
