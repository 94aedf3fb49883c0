pub mod args;
pub mod display;
pub mod sample;

pub use args::Config;
pub use display::{display_module, display_program};
pub use sample::sample_module;
