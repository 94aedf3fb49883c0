//! Kiln Compilation Pipeline
//!
//! This module provides the end-to-end path from an IR module to machine
//! code and an assembly listing.
//!
//! # Pipeline Stages
//!
//! ```text
//! IR (Module)
//!     │
//!     ▼ validate config
//! BackendConfig
//!     │
//!     ▼ lower (slot assignment + instruction selection)
//! x86-64 (X86Program)
//!     │
//!     ▼ encode
//! Machine code (Vec<EncodedFunction>)
//!     │
//!     ▼ emit
//! Listing (String)
//! ```

use crate::backend::emit::{emit_assembly, hex_dump};
use crate::backend::ir::Module;
use crate::backend::x86_64::{EncodedFunction, X86Program, encode_program, lower_program};
use crate::config::BackendConfig;
use crate::error::Result;
use tracing::debug;

/// Result of a successful compilation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOutput {
    /// Lowered instructions, one function per IR function
    pub program: X86Program,
    /// Machine code per function, in declaration order
    pub code: Vec<EncodedFunction>,
    /// Intel syntax listing of `program`
    pub assembly: String,
}

impl CompileOutput {
    /// Hex dump of the machine code, one function per line
    pub fn hex(&self) -> String {
        hex_dump(&self.code)
    }

    /// Total number of bytes across all functions
    pub fn code_size(&self) -> usize {
        self.code.iter().map(|f| f.code.len()).sum()
    }
}

/// Compile an IR module to x86-64 machine code
///
/// This is the main entry point for the backend. Lowering stops at the
/// first error; nothing is emitted for a module that fails.
///
/// # Example
///
/// ```
/// use kiln::backend::ir::{FunctionBuilder, Module, VirtualRegAllocator};
/// use kiln::config::BackendConfig;
/// use kiln::pipeline::compile;
///
/// let mut regs = VirtualRegAllocator::new();
/// let mut builder = FunctionBuilder::new("five", &mut regs);
/// let value = builder.initialize(5);
/// builder.ret(Some(value));
///
/// let mut module = Module::new();
/// module.add_function(builder.finish());
///
/// let output = compile(&module, &BackendConfig::default()).unwrap();
/// assert_eq!(
///     output.code[0].code,
///     vec![0x48, 0xB8, 0x05, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC3]
/// );
/// assert!(output.assembly.contains("mov rax, 5"));
/// ```
pub fn compile(module: &Module, config: &BackendConfig) -> Result<CompileOutput> {
    // Stage 1: Lower to x86-64 (validates the config first)
    let program = lower_program(module, config)?;

    // Stage 2: Encode
    let code = encode_program(&program)?;

    // Stage 3: Emit text
    let assembly = emit_assembly(&program);

    let output = CompileOutput {
        program,
        code,
        assembly,
    };
    debug!(
        functions = output.code.len(),
        bytes = output.code_size(),
        "compiled module"
    );
    Ok(output)
}
