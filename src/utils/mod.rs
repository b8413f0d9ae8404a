//! The `utils` module provides the pieces shared across `signalbus`:
//! the crate error type and logging setup.

pub mod error;
pub mod logging;

pub use error::BusError;
