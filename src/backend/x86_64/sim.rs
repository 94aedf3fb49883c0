//! Instruction-level simulator
//!
//! Executes the modeled instruction subset over a register file and a
//! stack, with the operand sizes the encoder produces. Moves and ALU
//! operations act on all 64 bits and wrap; 32-bit immediates are
//! sign-extended first.
//!
//! `syscall` is not executed; the value of RAX at each syscall is recorded
//! instead.

use super::instr::{X86Function, X86Instr};
use super::regs::X86Reg;
use thiserror::Error;

/// Simulation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    #[error("pop from empty stack at instruction {index}")]
    StackUnderflow { index: usize },
}

/// How a run ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Exit {
    /// `ret` executed; carries RAX at that point
    Returned(u64),
    /// Ran past the last instruction
    FellThrough,
}

/// Initial stack pointer, only used to keep RSP consistent with pushes
const STACK_TOP: u64 = 0x7fff_0000;

/// Simulated machine state
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Machine {
    regs: [u64; 8],
    stack: Vec<u64>,
    syscalls: Vec<u64>,
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

impl Machine {
    pub fn new() -> Self {
        let mut regs = [0; 8];
        regs[X86Reg::STACK_PTR.number() as usize] = STACK_TOP;
        Self {
            regs,
            stack: Vec::new(),
            syscalls: Vec::new(),
        }
    }

    pub fn get(&self, reg: X86Reg) -> u64 {
        self.regs[reg.number() as usize]
    }

    pub fn set(&mut self, reg: X86Reg, value: u64) {
        self.regs[reg.number() as usize] = value;
    }

    /// Values of RAX at every `syscall` executed so far
    pub fn syscalls(&self) -> &[u64] {
        &self.syscalls
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// Load `args` into `registers` pairwise, then run `func`
    pub fn call(
        &mut self,
        func: &X86Function,
        registers: &[X86Reg],
        args: &[u64],
    ) -> Result<Exit, SimError> {
        for (&reg, &value) in registers.iter().zip(args) {
            self.set(reg, value);
        }
        self.run(&func.instructions)
    }

    /// Execute instructions until `ret` or the end of the sequence
    pub fn run(&mut self, instructions: &[X86Instr]) -> Result<Exit, SimError> {
        for (index, instr) in instructions.iter().enumerate() {
            if let Some(exit) = self.step(index, instr)? {
                return Ok(exit);
            }
        }
        Ok(Exit::FellThrough)
    }

    fn step(&mut self, index: usize, instr: &X86Instr) -> Result<Option<Exit>, SimError> {
        match *instr {
            X86Instr::MovRR { dst, src } => self.set(dst, self.get(src)),
            X86Instr::MovRI { dst, imm } => self.set(dst, imm as u64),

            X86Instr::AddRR { dst, src } => self.alu(dst, src, u64::wrapping_add),
            X86Instr::AddRI { dst, imm } => {
                let value = self.get(dst).wrapping_add_signed(imm.into());
                self.set(dst, value);
            }
            X86Instr::SubRR { dst, src } => self.alu(dst, src, u64::wrapping_sub),
            X86Instr::ImulRR { dst, src } => self.alu(dst, src, u64::wrapping_mul),
            X86Instr::AndRR { dst, src } => self.alu(dst, src, |a, b| a & b),
            X86Instr::OrRR { dst, src } => self.alu(dst, src, |a, b| a | b),
            X86Instr::XorRR { dst, src } => self.alu(dst, src, |a, b| a ^ b),

            X86Instr::Push { src } => self.push(self.get(src)),
            X86Instr::PushI { imm } => self.push(imm as i64 as u64),
            X86Instr::Pop { dst } => {
                let value = self.stack.pop().ok_or(SimError::StackUnderflow { index })?;
                self.adjust_rsp(8);
                self.set(dst, value);
            }

            X86Instr::Syscall => {
                let number = self.get(X86Reg::Rax);
                self.syscalls.push(number);
            }
            X86Instr::Ret => return Ok(Some(Exit::Returned(self.get(X86Reg::Rax)))),
        }
        Ok(None)
    }

    fn alu(&mut self, dst: X86Reg, src: X86Reg, op: impl Fn(u64, u64) -> u64) {
        let value = op(self.get(dst), self.get(src));
        self.set(dst, value);
    }

    fn push(&mut self, value: u64) {
        self.stack.push(value);
        self.adjust_rsp(-8);
    }

    fn adjust_rsp(&mut self, delta: i64) {
        let rsp = self.get(X86Reg::STACK_PTR).wrapping_add_signed(delta);
        self.set(X86Reg::STACK_PTR, rsp);
    }
}
