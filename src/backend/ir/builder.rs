//! IR builder utilities
//!
//! This module provides a builder for constructing IR functions. Every
//! value-producing call allocates a fresh virtual register from the
//! caller's `VirtualRegAllocator`.

use super::instr::{BinaryOp, IrInstr};
use super::program::Function;
use super::regs::{VirtualReg, VirtualRegAllocator};

/// Builder for constructing IR functions
pub struct FunctionBuilder<'a> {
    /// Virtual register allocator
    regs: &'a mut VirtualRegAllocator,
    func: Function,
}

impl<'a> FunctionBuilder<'a> {
    pub fn new(name: impl Into<String>, regs: &'a mut VirtualRegAllocator) -> Self {
        Self {
            regs,
            func: Function::new(name),
        }
    }

    /// Declare the next argument
    pub fn argument(&mut self) -> VirtualReg {
        self.func.add_argument(self.regs)
    }

    /// `dst = value`
    pub fn initialize(&mut self, value: i64) -> VirtualReg {
        let vreg = self.regs.fresh();
        self.func
            .entry_block
            .append(IrInstr::Initialize { vreg, value });
        vreg
    }

    /// `dst = a op b`
    pub fn two_op(&mut self, op: BinaryOp, a: VirtualReg, b: VirtualReg) -> VirtualReg {
        let target = self.regs.fresh();
        self.func
            .entry_block
            .append(IrInstr::TwoOp { op, target, a, b });
        target
    }

    /// `dst = source`
    pub fn copy(&mut self, source: VirtualReg) -> VirtualReg {
        let target = self.regs.fresh();
        self.func
            .entry_block
            .append(IrInstr::Move { target, source });
        target
    }

    /// `return value`
    pub fn ret(&mut self, value: Option<VirtualReg>) {
        self.func
            .entry_block
            .append(IrInstr::Return { vreg: value });
    }

    pub fn finish(self) -> Function {
        self.func
    }
}
