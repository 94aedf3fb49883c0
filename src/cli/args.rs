use kiln::config::BackendConfig;
use std::env;

/// Configuration for the CLI application
pub struct Config {
    pub sample: String,
    pub output_path: Option<String>,
    pub verbose: bool,
    pub reuse_dead_registers: bool,
}

impl Config {
    /// Parse command line arguments and environment variables
    pub fn from_args() -> Self {
        let args: Vec<String> = env::args().collect();
        Self::parse(&args, env::var("VERBOSE").is_ok(), env::var("NO_REUSE").is_ok())
    }

    fn parse(args: &[String], verbose: bool, no_reuse: bool) -> Self {
        let sample = args.get(1).cloned().unwrap_or_else(|| "sum".to_string());
        let output_path = args.get(2).cloned();

        Config {
            sample,
            output_path,
            verbose,
            reuse_dead_registers: !no_reuse,
        }
    }

    /// Backend configuration selected by the environment
    pub fn backend(&self) -> BackendConfig {
        BackendConfig::new().with_reuse_dead_registers(self.reuse_dead_registers)
    }
}
