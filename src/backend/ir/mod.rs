//! Register-unbounded IR
//!
//! The IR handed to the backend: functions holding a single entry block of
//! three-address instructions over virtual registers.
//!
//! Virtual register names come from an explicit `VirtualRegAllocator`
//! owned by whoever builds the IR, so numbering is scoped to one
//! compilation run.

pub mod builder;
pub mod instr;
pub mod program;
pub mod regs;

pub use builder::FunctionBuilder;
pub use instr::{BinaryOp, IrInstr};
pub use program::{Block, Function, Module};
pub use regs::{VirtualReg, VirtualRegAllocator};
