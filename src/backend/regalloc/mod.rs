//! Register Allocation
//!
//! This module provides register allocation for mapping IR virtual registers
//! to x86-64 physical registers.
//!
//! # Pipeline
//!
//! ```text
//! IR block → Last-use Analysis → Slot Assignment (during lowering)
//! ```

pub mod allocator;
pub mod liveness;

pub use allocator::SlotAllocator;
pub use liveness::LastUse;
