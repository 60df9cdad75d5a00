//! Worker thread that owns the HTTP client and the async runtime.

pub mod commands;
pub mod runtime;
