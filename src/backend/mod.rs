//! Kiln Compiler Backend
//!
//! This module implements the backend of the Kiln compiler, which translates
//! register-unbounded IR into x86-64 machine code.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────┐
//! │       IR        │────▶│    Lowering     │────▶│    Encoding     │
//! │ (virtual regs)  │     │ (slot assigned) │     │  (BitSequence)  │
//! └─────────────────┘     └─────────────────┘     └─────────────────┘
//! ```
//!
//! # Modules
//!
//! - `bits`: bit sequences used to assemble instruction encodings
//! - `ir`: functions, blocks and instructions over virtual registers
//! - `regalloc`: slot assignment and last-use analysis
//! - `x86_64`: physical registers, instructions, lowering and encoding
//! - `emit`: assembly listings and hex dumps

pub mod bits;
pub mod emit;
pub mod ir;
pub mod regalloc;
pub mod x86_64;

pub use bits::BitSequence;

pub use ir::{
    BinaryOp, Function, FunctionBuilder, IrInstr, Module, VirtualReg, VirtualRegAllocator,
};

pub use x86_64::{X86Function, X86Instr, X86Program, X86Reg, encode_program, lower_program};

pub use emit::emit_assembly;
