//! x86-64 Backend
//!
//! This module provides the x86-64 code generation backend including:
//! - Register definitions
//! - Instruction types
//! - IR to x86-64 lowering
//! - Binary encoding
//! - An instruction-level simulator
//!
//! # Pipeline
//!
//! ```text
//! IR (virtual registers)
//!     │
//!     ▼ Lowering + Slot Assignment
//! x86-64 Instructions
//!     │
//!     ▼ Encoding
//! Machine Code
//! ```

pub mod encode;
pub mod instr;
pub mod lower;
pub mod regs;
pub mod sim;

#[cfg(test)]
mod tests;

pub use encode::{EncodedFunction, encode_function, encode_program};
pub use instr::{X86Function, X86Instr, X86Program};
pub use lower::{lower_function, lower_program};
pub use regs::X86Reg;
pub use sim::{Exit, Machine, SimError};
