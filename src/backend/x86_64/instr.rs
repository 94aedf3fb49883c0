//! x86-64 Instruction Definitions
//!
//! This module defines the x86-64 instruction subset that IR lowering
//! targets. Every variant carries physical registers and immediates only.

use super::encode;
use super::regs::X86Reg;
use crate::backend::bits::BitSequence;
use crate::error::Result;
use std::fmt;

/// x86-64 Instructions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum X86Instr {
    // === Data Movement ===
    /// mov reg, reg
    MovRR { dst: X86Reg, src: X86Reg },
    /// mov reg, imm64
    MovRI { dst: X86Reg, imm: i64 },

    // === Arithmetic ===
    /// add reg, reg
    AddRR { dst: X86Reg, src: X86Reg },
    /// add reg, imm32 (sign-extended)
    AddRI { dst: X86Reg, imm: i32 },
    /// sub reg, reg
    SubRR { dst: X86Reg, src: X86Reg },
    /// imul reg, reg (signed multiply)
    ImulRR { dst: X86Reg, src: X86Reg },

    // === Logical ===
    /// and reg, reg
    AndRR { dst: X86Reg, src: X86Reg },
    /// or reg, reg
    OrRR { dst: X86Reg, src: X86Reg },
    /// xor reg, reg
    XorRR { dst: X86Reg, src: X86Reg },

    // === Control Flow ===
    /// ret
    Ret,

    // === Stack ===
    /// push reg
    Push { src: X86Reg },
    /// push imm32 (sign-extended)
    PushI { imm: i32 },
    /// pop reg
    Pop { dst: X86Reg },

    // === System ===
    /// syscall
    Syscall,
}

impl X86Instr {
    /// Encode as a bit sequence; always a whole number of bytes
    pub fn encode(&self) -> BitSequence {
        encode::encode_instr(self)
    }

    /// Machine code bytes for this instruction
    pub fn machine_code(&self) -> Result<Vec<u8>> {
        self.encode().to_bytes()
    }

    /// Intel syntax text
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Mnemonic without operands
    pub fn mnemonic(&self) -> &'static str {
        match self {
            X86Instr::MovRR { .. } | X86Instr::MovRI { .. } => "mov",
            X86Instr::AddRR { .. } | X86Instr::AddRI { .. } => "add",
            X86Instr::SubRR { .. } => "sub",
            X86Instr::ImulRR { .. } => "imul",
            X86Instr::AndRR { .. } => "and",
            X86Instr::OrRR { .. } => "or",
            X86Instr::XorRR { .. } => "xor",
            X86Instr::Ret => "ret",
            X86Instr::Push { .. } | X86Instr::PushI { .. } => "push",
            X86Instr::Pop { .. } => "pop",
            X86Instr::Syscall => "syscall",
        }
    }
}

impl fmt::Display for X86Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.mnemonic();
        match self {
            X86Instr::MovRR { dst, src }
            | X86Instr::AddRR { dst, src }
            | X86Instr::SubRR { dst, src }
            | X86Instr::ImulRR { dst, src }
            | X86Instr::AndRR { dst, src }
            | X86Instr::OrRR { dst, src }
            | X86Instr::XorRR { dst, src } => write!(f, "{} {}, {}", name, dst, src),

            X86Instr::MovRI { dst, imm } => write!(f, "{} {}, {}", name, dst, imm),
            X86Instr::AddRI { dst, imm } => write!(f, "{} {}, {}", name, dst, imm),

            X86Instr::Push { src } => write!(f, "{} {}", name, src),
            X86Instr::PushI { imm } => write!(f, "{} {}", name, imm),
            X86Instr::Pop { dst } => write!(f, "{} {}", name, dst),

            X86Instr::Ret | X86Instr::Syscall => write!(f, "{}", name),
        }
    }
}

/// A sequence of x86-64 instructions forming a function
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct X86Function {
    pub name: String,
    pub instructions: Vec<X86Instr>,
}

impl X86Function {
    /// Concatenated machine code of every instruction in emission order
    pub fn machine_code(&self) -> Result<Vec<u8>> {
        let mut code = Vec::new();
        for instr in &self.instructions {
            code.extend(instr.machine_code()?);
        }
        Ok(code)
    }

    /// One line of Intel syntax per instruction
    pub fn assembly(&self) -> String {
        self.instructions
            .iter()
            .map(X86Instr::render)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A complete x86-64 program
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct X86Program {
    pub functions: Vec<X86Function>,
}
