mod cli;

use cli::{Config, display_module, display_program, sample_module};
use kiln::pipeline::compile;
use std::fs;
use std::process;

fn main() {
    // Parse configuration
    let config = Config::from_args();

    println!("\nsample: {}", config.sample);
    println!("{}", "=".repeat(60));

    // Build the IR
    let module = match sample_module(&config.sample) {
        Ok(module) => module,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(2);
        }
    };

    println!("\n[1] IR:");
    println!("{}", "-".repeat(60));
    if config.verbose {
        display_module(&module);
    } else {
        print!("{}", module);
    }
    println!("{}", "-".repeat(60));

    // Run the backend
    println!("\n[2] Lowering and encoding...");
    let output = match compile(&module, &config.backend()) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("Backend error: {}", e);
            process::exit(1);
        }
    };

    println!("\n[3] Assembly:");
    println!("{}", "=".repeat(60));
    if config.verbose {
        display_program(&output.program);
    } else {
        print!("{}", output.assembly);
    }

    println!("\n[4] Machine code:");
    println!("{}", "=".repeat(60));
    println!("{}", output.hex());

    if let Some(path) = &config.output_path {
        let bytes: Vec<u8> = output.code.iter().flat_map(|f| f.code.iter().copied()).collect();
        if let Err(e) = fs::write(path, &bytes) {
            eprintln!("Error writing '{}': {}", path, e);
            process::exit(1);
        }
        println!("\nWrote {} byte(s) to {}", bytes.len(), path);
    }

    println!("\n{}", "=".repeat(60));
    println!(
        "Successfully compiled {} function(s), {} byte(s)",
        output.program.functions.len(),
        output.code_size()
    );
}
