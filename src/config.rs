//! Backend configuration
//!
//! Register policy for lowering: which physical registers are handed out
//! and in what order, where arguments arrive and where results leave.

use crate::backend::x86_64::regs::X86Reg;
use crate::error::{BackendError, Result};

/// Configuration for IR lowering
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendConfig {
    /// Preference order for fresh definitions
    pub allocation_order: Vec<X86Reg>,
    /// Registers holding the arguments, in declaration order
    pub argument_registers: Vec<X86Reg>,
    /// Register a returned value must be in before `ret`
    pub return_register: X86Reg,
    /// Whether a register becomes free again after its value's last use
    pub reuse_dead_registers: bool,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            allocation_order: X86Reg::ALLOCATABLE.to_vec(),
            argument_registers: X86Reg::ARG_REGS.to_vec(),
            return_register: X86Reg::RETURN_REG,
            reuse_dead_registers: true,
        }
    }
}

impl BackendConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_allocation_order(mut self, order: Vec<X86Reg>) -> Self {
        self.allocation_order = order;
        self
    }

    pub fn with_argument_registers(mut self, regs: Vec<X86Reg>) -> Self {
        self.argument_registers = regs;
        self
    }

    pub fn with_return_register(mut self, reg: X86Reg) -> Self {
        self.return_register = reg;
        self
    }

    pub fn with_reuse_dead_registers(mut self, reuse: bool) -> Self {
        self.reuse_dead_registers = reuse;
        self
    }

    /// Check the register lists before lowering with them
    pub fn validate(&self) -> Result<()> {
        if self.allocation_order.is_empty() {
            return Err(invalid("allocation order is empty"));
        }

        check_register_list("allocation order", &self.allocation_order)?;
        check_register_list("argument registers", &self.argument_registers)?;

        if self.return_register == X86Reg::STACK_PTR {
            return Err(invalid("the stack pointer cannot be the return register"));
        }

        Ok(())
    }
}

fn check_register_list(what: &str, regs: &[X86Reg]) -> Result<()> {
    for (i, reg) in regs.iter().enumerate() {
        if *reg == X86Reg::STACK_PTR {
            return Err(invalid(&format!("{} contains the stack pointer", what)));
        }
        if regs[..i].contains(reg) {
            return Err(invalid(&format!("{} lists {} twice", what, reg)));
        }
    }
    Ok(())
}

fn invalid(reason: &str) -> BackendError {
    BackendError::InvalidConfig {
        reason: reason.to_string(),
    }
}
