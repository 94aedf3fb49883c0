//! IR program structures
//!
//! This module defines the module, function, and block structures of the IR.

use super::instr::IrInstr;
use super::regs::{VirtualReg, VirtualRegAllocator};
use std::fmt;

/// An IR module is a collection of functions, emitted in declaration order
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Module {
    pub functions: Vec<Function>,
}

impl Module {
    pub fn new() -> Self {
        Self {
            functions: Vec::new(),
        }
    }

    pub fn add_function(&mut self, func: Function) {
        self.functions.push(func);
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, func) in self.functions.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", func)?;
        }
        Ok(())
    }
}

/// A function with a single entry block
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    /// Argument registers in declaration order
    pub arguments: Vec<VirtualReg>,
    pub entry_block: Block,
}

impl Function {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
            entry_block: Block::new(),
        }
    }

    /// Declare the next argument, allocating its register
    pub fn add_argument(&mut self, regs: &mut VirtualRegAllocator) -> VirtualReg {
        let reg = regs.fresh();
        self.arguments.push(reg);
        reg
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args = self
            .arguments
            .iter()
            .map(VirtualReg::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(f, "function {}({}):", self.name, args)?;
        for instr in self.entry_block.iter() {
            writeln!(f, "    {}", instr)?;
        }
        Ok(())
    }
}

/// An ordered, append-only sequence of instructions
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Block {
    instructions: Vec<IrInstr>,
}

impl Block {
    pub fn new() -> Self {
        Self {
            instructions: Vec::new(),
        }
    }

    /// Add an instruction to the end of this block
    pub fn append(&mut self, instr: IrInstr) {
        self.instructions.push(instr);
    }

    pub fn instructions(&self) -> &[IrInstr] {
        &self.instructions
    }

    pub fn iter(&self) -> impl Iterator<Item = &IrInstr> {
        self.instructions.iter()
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines = self
            .instructions
            .iter()
            .map(IrInstr::to_string)
            .collect::<Vec<_>>();
        write!(f, "{}", lines.join("\n"))
    }
}
