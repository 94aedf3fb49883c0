//! Text emission for lowered programs
//!
//! Listings use Intel syntax with a `name:` label per function. Hex dumps
//! print one function per line.

use crate::backend::x86_64::encode::EncodedFunction;
use crate::backend::x86_64::instr::{X86Function, X86Program};

/// Emit a function as a label line followed by indented instructions
pub fn emit_function(func: &X86Function) -> String {
    let mut output = format!("{}:\n", func.name);
    for instr in &func.instructions {
        output.push_str("    ");
        output.push_str(&instr.render());
        output.push('\n');
    }
    output
}

/// Emit every function in declaration order, separated by blank lines
pub fn emit_assembly(program: &X86Program) -> String {
    program
        .functions
        .iter()
        .map(emit_function)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Space separated upper-case hex bytes, one function per line
pub fn hex_dump(functions: &[EncodedFunction]) -> String {
    functions
        .iter()
        .map(|f| {
            let bytes = f
                .code
                .iter()
                .map(|b| format!("{:02X}", b))
                .collect::<Vec<_>>()
                .join(" ");
            format!("{}: {}", f.name, bytes)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
