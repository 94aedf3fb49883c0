//! Error types for the kiln backend
//!
//! Every failure in the backend is fail-fast: the error is returned to the
//! immediate caller with enough context (offending value, register or
//! instruction index) to diagnose the input that caused it.

use thiserror::Error;

/// Backend errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    // Bit sequence construction
    /// A literal could not be parsed as a bit pattern
    ///
    /// **Triggered by:** `BitSequence::from_hex("C3G")`, `BitSequence::from_binary("102")`
    #[error("Malformed literal '{literal}': {reason}")]
    MalformedLiteral {
        /// The literal as given
        literal: String,
        /// What was wrong with it
        reason: String,
    },

    /// A value does not fit in the requested number of bits
    #[error("Value {value} does not fit in {width} bit(s)")]
    Overflow {
        /// The value that was requested
        value: u128,
        /// The available width in bits
        width: usize,
    },

    /// A bit sequence was serialized while not byte aligned
    ///
    /// This is always an encoder bug, never a user error.
    #[error("Bit sequence of length {len} is not byte aligned")]
    AlignmentError {
        /// Total length in bits
        len: usize,
    },

    // Register model
    /// Register name or number outside the modeled register set
    #[error("Unknown register: {name}")]
    UnknownRegister {
        /// The name (or `#<number>` for numeric lookups)
        name: String,
    },

    // Lowering
    /// An IR instruction reads a virtual register that has no earlier definition
    #[error("Virtual register {vreg} used before definition in '{function}' at instruction {index}")]
    UseBeforeDefinition {
        function: String,
        index: usize,
        vreg: String,
    },

    /// Too many values are live at once for the physical register file
    #[error(
        "Register exhaustion in '{function}' at instruction {index}: no free register for {vreg} ({available} allocatable)"
    )]
    RegisterExhaustion {
        function: String,
        index: usize,
        vreg: String,
        available: usize,
    },

    /// A virtual register is defined a second time
    #[error("Virtual register {vreg} redefined in '{function}' at instruction {index}")]
    Redefinition {
        function: String,
        index: usize,
        vreg: String,
    },

    /// Operation symbol without a matching two-operand instruction
    #[error("Unsupported operation: '{symbol}'")]
    UnsupportedOperation { symbol: String },

    /// Function declares more arguments than there are argument registers
    #[error("Function '{function}' has {count} arguments, only {available} argument registers")]
    TooManyArguments {
        function: String,
        count: usize,
        available: usize,
    },

    // Configuration
    /// Backend configuration rejected by validation
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

/// Result type alias for backend operations
pub type Result<T> = std::result::Result<T, BackendError>;
