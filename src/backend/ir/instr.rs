//! IR instructions
//!
//! Three-address instructions over virtual registers. Every instruction
//! defines at most one virtual register.

use super::regs::VirtualReg;
use crate::error::{BackendError, Result};
use std::fmt;
use std::str::FromStr;

/// Two-operand operations
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    And,
    Or,
    Xor,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 6] = [
        BinaryOp::Add,
        BinaryOp::Sub,
        BinaryOp::Mul,
        BinaryOp::And,
        BinaryOp::Or,
        BinaryOp::Xor,
    ];

    /// Parse an operator symbol such as `+`
    pub fn from_symbol(symbol: &str) -> Result<BinaryOp> {
        Self::ALL
            .iter()
            .copied()
            .find(|op| op.symbol() == symbol)
            .ok_or_else(|| BackendError::UnsupportedOperation {
                symbol: symbol.to_string(),
            })
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::And => "&",
            BinaryOp::Or => "|",
            BinaryOp::Xor => "^",
        }
    }

    /// Evaluate with 64-bit wrapping semantics
    pub fn apply(self, a: u64, b: u64) -> u64 {
        match self {
            BinaryOp::Add => a.wrapping_add(b),
            BinaryOp::Sub => a.wrapping_sub(b),
            BinaryOp::Mul => a.wrapping_mul(b),
            BinaryOp::And => a & b,
            BinaryOp::Or => a | b,
            BinaryOp::Xor => a ^ b,
        }
    }
}

impl FromStr for BinaryOp {
    type Err = BackendError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_symbol(s)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// IR instructions
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IrInstr {
    /// target = a op b
    TwoOp {
        op: BinaryOp,
        target: VirtualReg,
        a: VirtualReg,
        b: VirtualReg,
    },

    /// vreg = literal
    Initialize { vreg: VirtualReg, value: i64 },

    /// target = source
    Move {
        target: VirtualReg,
        source: VirtualReg,
    },

    /// return vreg
    Return { vreg: Option<VirtualReg> },
}

impl IrInstr {
    /// Get the register this instruction defines (if any)
    pub fn dst(&self) -> Option<VirtualReg> {
        match self {
            IrInstr::TwoOp { target, .. } => Some(*target),
            IrInstr::Initialize { vreg, .. } => Some(*vreg),
            IrInstr::Move { target, .. } => Some(*target),
            IrInstr::Return { .. } => None,
        }
    }

    /// Registers read by this instruction, in operand order
    pub fn uses(&self) -> Vec<VirtualReg> {
        match self {
            IrInstr::TwoOp { a, b, .. } => vec![*a, *b],
            IrInstr::Initialize { .. } => vec![],
            IrInstr::Move { source, .. } => vec![*source],
            IrInstr::Return { vreg } => vreg.iter().copied().collect(),
        }
    }
}

impl fmt::Display for IrInstr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrInstr::TwoOp { op, target, a, b } => write!(f, "{} = {} {} {}", target, a, op, b),
            IrInstr::Initialize { vreg, value } => write!(f, "{} = {}", vreg, value),
            IrInstr::Move { target, source } => write!(f, "{} = {}", target, source),
            IrInstr::Return { vreg: Some(v) } => write!(f, "return {}", v),
            IrInstr::Return { vreg: None } => write!(f, "return None"),
        }
    }
}
