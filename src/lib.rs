//! Kiln: an x86-64 backend for register-unbounded IR
//!
//! Kiln lowers functions written over an unbounded supply of virtual
//! registers onto the eight legacy x86-64 general-purpose registers and
//! encodes the result as machine code.
//!
//! See [`pipeline::compile`] for the end-to-end entry point.

pub mod backend;
pub mod config;
pub mod error;
pub mod pipeline;

pub use config::BackendConfig;
pub use error::{BackendError, Result};
pub use pipeline::{CompileOutput, compile};
