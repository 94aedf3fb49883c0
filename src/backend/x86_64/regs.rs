//! x86-64 Register Definitions
//!
//! This module defines the legacy x86-64 general purpose registers, the ones
//! addressable through a 3-bit ModR/M field without a REX prefix.

use crate::backend::bits::BitSequence;
use crate::error::{BackendError, Result};
use std::fmt;
use std::str::FromStr;

/// x86-64 General Purpose Registers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum X86Reg {
    Rax, // Return value, accumulator
    Rcx, // 4th argument
    Rdx, // 3rd argument
    Rbx, // Callee-saved
    Rsp, // Stack pointer
    Rbp, // Base pointer
    Rsi, // 2nd argument
    Rdi, // 1st argument
}

impl X86Reg {
    /// Every modeled register, in encoding order
    pub const ALL: [X86Reg; 8] = [
        X86Reg::Rax,
        X86Reg::Rcx,
        X86Reg::Rdx,
        X86Reg::Rbx,
        X86Reg::Rsp,
        X86Reg::Rbp,
        X86Reg::Rsi,
        X86Reg::Rdi,
    ];

    /// Registers available for allocation (excludes RSP and RBP)
    pub const ALLOCATABLE: &'static [X86Reg] = &[
        X86Reg::Rax,
        X86Reg::Rcx,
        X86Reg::Rdx,
        X86Reg::Rbx,
        X86Reg::Rsi,
        X86Reg::Rdi,
    ];

    /// Argument registers (System V AMD64 ABI order, legacy registers only)
    pub const ARG_REGS: &'static [X86Reg] = &[
        X86Reg::Rdi, // 1st argument
        X86Reg::Rsi, // 2nd argument
        X86Reg::Rdx, // 3rd argument
        X86Reg::Rcx, // 4th argument
    ];

    /// Return value register
    pub const RETURN_REG: X86Reg = X86Reg::Rax;

    /// Stack pointer
    pub const STACK_PTR: X86Reg = X86Reg::Rsp;

    /// Base pointer
    pub const BASE_PTR: X86Reg = X86Reg::Rbp;

    /// Get the 3-bit register number used in ModR/M and opcode+reg forms
    pub fn number(self) -> u8 {
        match self {
            X86Reg::Rax => 0,
            X86Reg::Rcx => 1,
            X86Reg::Rdx => 2,
            X86Reg::Rbx => 3,
            X86Reg::Rsp => 4,
            X86Reg::Rbp => 5,
            X86Reg::Rsi => 6,
            X86Reg::Rdi => 7,
        }
    }

    /// The register number as a 3-bit field
    pub fn bits(self) -> BitSequence {
        let n = self.number();
        BitSequence::from_bits((0..3).rev().map(|i| (n >> i) & 1 == 1))
    }

    /// Reverse lookup from a 3-bit register number
    pub fn from_number(number: u8) -> Result<X86Reg> {
        Self::ALL
            .get(number as usize)
            .copied()
            .ok_or_else(|| BackendError::UnknownRegister {
                name: format!("#{}", number),
            })
    }

    /// Look up a register by its assembly name
    pub fn from_name(name: &str) -> Result<X86Reg> {
        Self::ALL
            .iter()
            .copied()
            .find(|reg| reg.name() == name)
            .ok_or_else(|| BackendError::UnknownRegister {
                name: name.to_string(),
            })
    }

    pub fn name(self) -> &'static str {
        match self {
            X86Reg::Rax => "rax",
            X86Reg::Rcx => "rcx",
            X86Reg::Rdx => "rdx",
            X86Reg::Rbx => "rbx",
            X86Reg::Rsp => "rsp",
            X86Reg::Rbp => "rbp",
            X86Reg::Rsi => "rsi",
            X86Reg::Rdi => "rdi",
        }
    }
}

impl FromStr for X86Reg {
    type Err = BackendError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

impl fmt::Display for X86Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
