//! IR to x86-64 Lowering
//!
//! This module translates IR instructions with virtual registers into
//! x86-64 instructions with physical registers, assigning registers as it
//! goes.
//!
//! # Pipeline
//!
//! ```text
//! IR (virtual regs) → Slot Assignment + Instruction Selection → x86-64 Instructions
//! ```
//!
//! # Two-operand instructions
//!
//! The x86 ALU forms are destructive (`add dst, src` overwrites `dst`). A
//! `TwoOp` target is always given a register distinct from both operands,
//! so lowering copies the first operand into it before applying the
//! operation:
//!
//! ```text
//! #3 = #1 + #2     →     mov t, a
//!                        add t, b
//! ```

use crate::backend::ir::{BinaryOp, Function, IrInstr, Module, VirtualReg};
use crate::backend::regalloc::{LastUse, SlotAllocator};
use crate::backend::x86_64::instr::{X86Function, X86Instr, X86Program};
use crate::backend::x86_64::regs::X86Reg;
use crate::config::BackendConfig;
use crate::error::{BackendError, Result};
use tracing::{debug, trace, warn};

/// Lower an IR module to x86-64
pub fn lower_program(module: &Module, config: &BackendConfig) -> Result<X86Program> {
    config.validate()?;

    let functions = module
        .functions
        .iter()
        .map(|func| lower_validated(func, config))
        .collect::<Result<Vec<_>>>()?;

    Ok(X86Program { functions })
}

/// Lower an IR function to x86-64
pub fn lower_function(func: &Function, config: &BackendConfig) -> Result<X86Function> {
    config.validate()?;
    lower_validated(func, config)
}

fn lower_validated(func: &Function, config: &BackendConfig) -> Result<X86Function> {
    debug!(function = %func.name, instructions = func.entry_block.len(), "lowering");

    FunctionLowerer::new(func, config)
        .lower()
        .inspect(|out| {
            debug!(function = %out.name, emitted = out.instructions.len(), "lowered")
        })
        .inspect_err(|err| warn!(function = %func.name, %err, "lowering failed"))
}

/// Function lowering context
struct FunctionLowerer<'a> {
    func: &'a Function,
    config: &'a BackendConfig,
    allocator: SlotAllocator,
    liveness: LastUse,
    instructions: Vec<X86Instr>,
}

impl<'a> FunctionLowerer<'a> {
    fn new(func: &'a Function, config: &'a BackendConfig) -> Self {
        Self {
            func,
            config,
            allocator: SlotAllocator::new(config),
            liveness: LastUse::analyze(&func.entry_block),
            instructions: Vec::new(),
        }
    }

    fn lower(mut self) -> Result<X86Function> {
        self.bind_arguments()?;

        let func = self.func;
        for (index, instr) in func.entry_block.iter().enumerate() {
            self.lower_instruction(index, instr)?;
            self.release_dead(index, instr);
        }

        Ok(X86Function {
            name: func.name.clone(),
            instructions: self.instructions,
        })
    }

    /// Bind arguments to their ABI registers before the first instruction
    fn bind_arguments(&mut self) -> Result<()> {
        let available = self.config.argument_registers.len();
        if self.func.arguments.len() > available {
            return Err(BackendError::TooManyArguments {
                function: self.func.name.clone(),
                count: self.func.arguments.len(),
                available,
            });
        }

        for (&vreg, &reg) in self
            .func
            .arguments
            .iter()
            .zip(&self.config.argument_registers)
        {
            if self.allocator.is_defined(vreg) {
                return Err(self.redefinition(0, vreg));
            }
            self.allocator.bind(vreg, reg);
        }

        // Arguments nobody reads give their register back immediately
        for &vreg in &self.func.arguments {
            if self.liveness.last_use(vreg).is_none() {
                self.allocator.release(vreg);
            }
        }

        Ok(())
    }

    /// Lower a single IR instruction
    fn lower_instruction(&mut self, index: usize, instr: &IrInstr) -> Result<()> {
        trace!(index, %instr, "lower");

        match instr {
            IrInstr::Initialize { vreg, value } => self.lower_initialize(index, *vreg, *value),

            IrInstr::TwoOp { op, target, a, b } => {
                self.lower_two_op(index, *op, *target, *a, *b)
            }

            IrInstr::Move { target, source } => self.lower_move(index, *target, *source),

            IrInstr::Return { vreg } => self.lower_return(index, *vreg),
        }
    }

    /// Every `i64` fits the 64-bit immediate form, so this only fails on
    /// allocation
    fn lower_initialize(&mut self, index: usize, vreg: VirtualReg, value: i64) -> Result<()> {
        let dst = self.define(index, vreg)?;
        self.emit(X86Instr::MovRI { dst, imm: value });
        Ok(())
    }

    fn lower_two_op(
        &mut self,
        index: usize,
        op: BinaryOp,
        target: VirtualReg,
        a: VirtualReg,
        b: VirtualReg,
    ) -> Result<()> {
        let lhs = self.resolve(index, a)?;
        let rhs = self.resolve(index, b)?;

        // Operands are still bound here, so the target cannot alias either
        let dst = self.define(index, target)?;

        self.emit(X86Instr::MovRR { dst, src: lhs });
        self.emit(alu_instr(op, dst, rhs));
        Ok(())
    }

    fn lower_move(&mut self, index: usize, target: VirtualReg, source: VirtualReg) -> Result<()> {
        let src = self.resolve(index, source)?;

        if self.allocator.is_defined(target) {
            return Err(self.redefinition(index, target));
        }

        // A source read for the last time hands its register to the target
        let coalesce = self.allocator.reuses_dead() && self.liveness.dead_after(source, index);
        let dst = if coalesce {
            self.allocator
                .transfer(source, target)
                .ok_or_else(|| self.use_before_definition(index, source))?
        } else {
            self.define(index, target)?
        };

        if dst != src {
            self.emit(X86Instr::MovRR { dst, src });
        }
        Ok(())
    }

    fn lower_return(&mut self, index: usize, vreg: Option<VirtualReg>) -> Result<()> {
        if let Some(vreg) = vreg {
            let src = self.resolve(index, vreg)?;
            let ret = self.config.return_register;
            if src != ret {
                self.emit(X86Instr::MovRR { dst: ret, src });
            }
        }

        self.emit(X86Instr::Ret);
        Ok(())
    }

    /// Free registers whose values are not read after `index`
    fn release_dead(&mut self, index: usize, instr: &IrInstr) {
        for vreg in instr.uses().into_iter().chain(instr.dst()) {
            if self.liveness.dead_after(vreg, index) {
                self.allocator.release(vreg);
            }
        }
    }

    /// Physical register holding an operand
    fn resolve(&self, index: usize, vreg: VirtualReg) -> Result<X86Reg> {
        self.allocator
            .location(vreg)
            .ok_or_else(|| self.use_before_definition(index, vreg))
    }

    /// Assign a register to a newly defined value
    fn define(&mut self, index: usize, vreg: VirtualReg) -> Result<X86Reg> {
        if self.allocator.is_defined(vreg) {
            return Err(self.redefinition(index, vreg));
        }

        self.allocator
            .allocate(vreg)
            .ok_or_else(|| BackendError::RegisterExhaustion {
                function: self.func.name.clone(),
                index,
                vreg: vreg.name(),
                available: self.allocator.capacity(),
            })
    }

    fn emit(&mut self, instr: X86Instr) {
        trace!(%instr, "emit");
        self.instructions.push(instr);
    }

    fn use_before_definition(&self, index: usize, vreg: VirtualReg) -> BackendError {
        BackendError::UseBeforeDefinition {
            function: self.func.name.clone(),
            index,
            vreg: vreg.name(),
        }
    }

    fn redefinition(&self, index: usize, vreg: VirtualReg) -> BackendError {
        BackendError::Redefinition {
            function: self.func.name.clone(),
            index,
            vreg: vreg.name(),
        }
    }
}

/// Destructive two-operand instruction for an IR operation
fn alu_instr(op: BinaryOp, dst: X86Reg, src: X86Reg) -> X86Instr {
    match op {
        BinaryOp::Add => X86Instr::AddRR { dst, src },
        BinaryOp::Sub => X86Instr::SubRR { dst, src },
        BinaryOp::Mul => X86Instr::ImulRR { dst, src },
        BinaryOp::And => X86Instr::AndRR { dst, src },
        BinaryOp::Or => X86Instr::OrRR { dst, src },
        BinaryOp::Xor => X86Instr::XorRR { dst, src },
    }
}
