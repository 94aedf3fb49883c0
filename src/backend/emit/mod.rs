//! Assembly Text and Machine Code Output
//!
//! This module renders lowered programs as Intel syntax listings and as
//! hex dumps of their machine code. Both are diagnostic output; neither is
//! parsed back.

mod emitter;

pub use emitter::{emit_function, emit_assembly, hex_dump};
