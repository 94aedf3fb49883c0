//! Virtual registers
//!
//! A virtual register is an unbounded symbolic slot. It has no encoding
//! number until lowering binds it to a physical register.

use std::fmt;

/// A virtual register (before physical allocation)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VirtualReg(pub u32);

impl VirtualReg {
    /// Display name, `#<n>`
    pub fn name(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for VirtualReg {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Allocator for virtual registers
///
/// Numbers are handed out monotonically starting at 1 and never reused for
/// the lifetime of the allocator.
#[derive(Debug, Default)]
pub struct VirtualRegAllocator {
    count: u32,
}

impl VirtualRegAllocator {
    pub fn new() -> Self {
        Self { count: 0 }
    }

    /// Allocate a fresh virtual register
    pub fn fresh(&mut self) -> VirtualReg {
        self.count += 1;
        VirtualReg(self.count)
    }

    /// Get the number of registers allocated so far
    pub fn count(&self) -> u32 {
        self.count
    }
}
