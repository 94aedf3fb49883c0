//! x86-64 Instruction Encoding
//!
//! This module encodes x86-64 instructions into machine code.
//!
//! # Encoding Format
//!
//! The modeled subset uses these shapes:
//! ```text
//! [REX.W] [Opcode + reg]    [imm64]           mov reg, imm64
//! [REX.W] [Opcode] [ModR/M] [imm32?]          mov/add/sub/imul/and/or/xor, add imm32
//! [Opcode + reg]                              push, pop
//! [Opcode]                  [imm32?]          ret, syscall, push imm32
//! ```
//!
//! ModR/M for two registers is `11 reg rm`. The `reg` field holds the source
//! register and `rm` the target, except for `imul` whose `0F AF` form reads
//! the target from `reg`.
//!
//! Register and immediate forms carry REX.W, so every ALU operation works on
//! the full 64-bit register. `add reg, imm32` and `push imm32` sign-extend
//! their immediate. Immediates are stored little-endian. Only the legacy
//! registers are modeled, so REX.R and REX.B are always clear.

use super::instr::{X86Function, X86Instr, X86Program};
use super::regs::X86Reg;
use crate::backend::bits::BitSequence;
use crate::error::Result;
use tracing::trace;

/// REX prefix with W set: 64-bit operand size
const REX_W: u8 = 0x48;

const OP_ADD_RM_R: u8 = 0x01;
const OP_OR_RM_R: u8 = 0x09;
const OP_AND_RM_R: u8 = 0x21;
const OP_SUB_RM_R: u8 = 0x29;
const OP_XOR_RM_R: u8 = 0x31;
const OP_MOV_RM_R: u8 = 0x89;
const OP_ALU_RM_IMM32: u8 = 0x81;
const OP_PUSH_R: u8 = 0x50;
const OP_POP_R: u8 = 0x58;
const OP_PUSH_IMM32: u8 = 0x68;
const OP_MOV_R_IMM64: u8 = 0xB8;
const OP_RET: u8 = 0xC3;
const OP_IMUL_R_RM: [u8; 2] = [0x0F, 0xAF];
const OP_SYSCALL: [u8; 2] = [0x0F, 0x05];

/// `/0` opcode extension selecting `add` within the 0x81 group
const EXT_ADD: u8 = 0;

/// ModR/M mode: the r/m field is also a register
const MOD_REG: u8 = 0b11;

/// Encode a single instruction
pub fn encode_instr(instr: &X86Instr) -> BitSequence {
    match *instr {
        X86Instr::MovRR { dst, src } => encode_rr(&[OP_MOV_RM_R], src.bits(), dst.bits()),
        X86Instr::AddRR { dst, src } => encode_rr(&[OP_ADD_RM_R], src.bits(), dst.bits()),
        X86Instr::SubRR { dst, src } => encode_rr(&[OP_SUB_RM_R], src.bits(), dst.bits()),
        X86Instr::AndRR { dst, src } => encode_rr(&[OP_AND_RM_R], src.bits(), dst.bits()),
        X86Instr::OrRR { dst, src } => encode_rr(&[OP_OR_RM_R], src.bits(), dst.bits()),
        X86Instr::XorRR { dst, src } => encode_rr(&[OP_XOR_RM_R], src.bits(), dst.bits()),
        X86Instr::ImulRR { dst, src } => encode_rr(&OP_IMUL_R_RM, dst.bits(), src.bits()),

        X86Instr::MovRI { dst, imm } => BitSequence::join([
            BitSequence::from_byte(REX_W),
            encode_plus_reg(OP_MOV_R_IMM64, dst),
            imm64(imm),
        ]),

        X86Instr::AddRI { dst, imm } => BitSequence::join([
            BitSequence::from_byte(REX_W),
            BitSequence::from_byte(OP_ALU_RM_IMM32),
            modrm(ext_field(EXT_ADD), dst.bits()),
            imm32(imm),
        ]),

        X86Instr::Push { src } => encode_plus_reg(OP_PUSH_R, src),
        X86Instr::PushI { imm } => {
            BitSequence::join([BitSequence::from_byte(OP_PUSH_IMM32), imm32(imm)])
        }
        X86Instr::Pop { dst } => encode_plus_reg(OP_POP_R, dst),

        X86Instr::Ret => BitSequence::from_byte(OP_RET),
        X86Instr::Syscall => BitSequence::from_bytes(&OP_SYSCALL),
    }
}

/// Encode reg-reg instruction: REX.W, opcode, then `11 reg rm`
fn encode_rr(opcode: &[u8], reg: BitSequence, rm: BitSequence) -> BitSequence {
    BitSequence::join([
        BitSequence::from_byte(REX_W),
        BitSequence::from_bytes(opcode),
        modrm(reg, rm),
    ])
}

/// Register-to-register ModR/M byte
fn modrm(reg: BitSequence, rm: BitSequence) -> BitSequence {
    let mode = BitSequence::from_bits([MOD_REG & 0b10 != 0, MOD_REG & 0b01 != 0]);
    BitSequence::join([mode, reg, rm])
}

/// Opcode extension in place of a register field
fn ext_field(ext: u8) -> BitSequence {
    BitSequence::from_bits((0..3).rev().map(|i| (ext >> i) & 1 == 1))
}

/// Single byte opcode with the register number added into its low bits
fn encode_plus_reg(base: u8, reg: X86Reg) -> BitSequence {
    BitSequence::from_byte(base + reg.number())
}

/// 32-bit immediate, little-endian
fn imm32(imm: i32) -> BitSequence {
    BitSequence::from_bytes(&imm.to_le_bytes())
}

/// 64-bit immediate, little-endian
fn imm64(imm: i64) -> BitSequence {
    BitSequence::from_bytes(&imm.to_le_bytes())
}

/// Machine code for one function
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedFunction {
    pub name: String,
    /// Raw machine code bytes
    pub code: Vec<u8>,
}

/// Encode a function, concatenating instructions in emission order
pub fn encode_function(func: &X86Function) -> Result<EncodedFunction> {
    let mut code = Vec::new();

    for instr in &func.instructions {
        let bytes = instr.machine_code()?;
        trace!(function = %func.name, offset = code.len(), %instr, ?bytes, "encoded");
        code.extend(bytes);
    }

    Ok(EncodedFunction {
        name: func.name.clone(),
        code,
    })
}

/// Encode every function of a program, in declaration order
pub fn encode_program(program: &X86Program) -> Result<Vec<EncodedFunction>> {
    program.functions.iter().map(encode_function).collect()
}
