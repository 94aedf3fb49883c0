use kiln::backend::ir::Module;
use kiln::backend::x86_64::X86Program;

/// Display the IR module in a human-readable format
pub fn display_module(module: &Module) {
    println!("\nModule with {} function(s):", module.functions.len());

    for func in &module.functions {
        let params: Vec<String> = func.arguments.iter().map(|a| a.to_string()).collect();
        println!(
            "\n  Function: '{}' ({}) - {} instruction(s)",
            func.name,
            params.join(", "),
            func.entry_block.len()
        );

        for (i, instr) in func.entry_block.iter().enumerate() {
            println!("    [{}] {}", i, instr);
        }
    }
}

/// Display lowered functions with their encoded bytes per instruction
pub fn display_program(program: &X86Program) {
    for func in &program.functions {
        println!("\n  {}:", func.name);
        for instr in &func.instructions {
            let bytes = match instr.machine_code() {
                Ok(code) => code
                    .iter()
                    .map(|b| format!("{:02X}", b))
                    .collect::<Vec<_>>()
                    .join(" "),
                Err(e) => format!("<{}>", e),
            };
            println!("    {:<24} {}", instr.to_string(), bytes);
        }
    }
}
