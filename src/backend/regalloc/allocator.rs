//! Register Allocator
//!
//! This module implements naive slot assignment for mapping IR virtual
//! registers to x86-64 physical registers.
//!
//! # Algorithm
//!
//! 1. Arguments are pre-bound to their argument registers
//! 2. Every other definition takes the first unused register in the
//!    configured preference order
//! 3. With dead-register reuse enabled, a register becomes unused again
//!    once its value has been read for the last time
//!
//! There is no spilling: running out of registers is reported to the caller.

use crate::backend::ir::VirtualReg;
use crate::backend::x86_64::regs::X86Reg;
use crate::config::BackendConfig;
use std::collections::{HashMap, HashSet};
use tracing::trace;

/// Slot allocator for a single function
#[derive(Debug)]
pub struct SlotAllocator {
    /// Preference order for fresh definitions
    order: Vec<X86Reg>,
    /// Current virtual to physical bindings
    bindings: HashMap<VirtualReg, X86Reg>,
    /// Physical registers in use and their owner
    occupied: HashMap<X86Reg, VirtualReg>,
    /// Every register ever defined, including released ones
    defined: HashSet<VirtualReg>,
    reuse_dead: bool,
}

impl SlotAllocator {
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            order: config.allocation_order.clone(),
            bindings: HashMap::new(),
            occupied: HashMap::new(),
            defined: HashSet::new(),
            reuse_dead: config.reuse_dead_registers,
        }
    }

    /// Physical register currently holding `vreg`
    pub fn location(&self, vreg: VirtualReg) -> Option<X86Reg> {
        self.bindings.get(&vreg).copied()
    }

    /// Whether `vreg` has been defined at any point
    pub fn is_defined(&self, vreg: VirtualReg) -> bool {
        self.defined.contains(&vreg)
    }

    /// Bind `vreg` to the first unused register in preference order
    ///
    /// Returns `None` when every register in the order is occupied.
    pub fn allocate(&mut self, vreg: VirtualReg) -> Option<X86Reg> {
        let reg = self
            .order
            .iter()
            .copied()
            .find(|reg| !self.occupied.contains_key(reg))?;
        self.bind(vreg, reg);
        Some(reg)
    }

    /// Bind `vreg` to a specific register
    pub fn bind(&mut self, vreg: VirtualReg, reg: X86Reg) {
        trace!(%vreg, %reg, "bind");
        self.bindings.insert(vreg, reg);
        self.occupied.insert(reg, vreg);
        self.defined.insert(vreg);
    }

    /// Hand the register of `from` over to `to`
    pub fn transfer(&mut self, from: VirtualReg, to: VirtualReg) -> Option<X86Reg> {
        let reg = self.bindings.remove(&from)?;
        trace!(%from, %to, %reg, "transfer");
        self.bind(to, reg);
        Some(reg)
    }

    /// Free the register of a value that is no longer needed
    ///
    /// Does nothing when dead-register reuse is disabled.
    pub fn release(&mut self, vreg: VirtualReg) {
        if !self.reuse_dead {
            return;
        }

        if let Some(reg) = self.bindings.remove(&vreg) {
            if self.occupied.get(&reg) == Some(&vreg) {
                self.occupied.remove(&reg);
            }
            trace!(%vreg, %reg, "release");
        }
    }

    /// Whether released registers are handed out again
    pub fn reuses_dead(&self) -> bool {
        self.reuse_dead
    }

    /// Number of registers in the preference order
    pub fn capacity(&self) -> usize {
        self.order.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocates_in_preference_order() {
        let mut alloc = SlotAllocator::new(&BackendConfig::default());

        assert_eq!(alloc.allocate(VirtualReg(1)), Some(X86Reg::Rax));
        assert_eq!(alloc.allocate(VirtualReg(2)), Some(X86Reg::Rcx));
        assert_eq!(alloc.location(VirtualReg(1)), Some(X86Reg::Rax));
        assert!(alloc.is_defined(VirtualReg(2)));
        assert!(!alloc.is_defined(VirtualReg(3)));
    }

    #[test]
    fn test_skips_prebound_registers() {
        let mut alloc = SlotAllocator::new(&BackendConfig::default());
        alloc.bind(VirtualReg(1), X86Reg::Rax);

        assert_eq!(alloc.allocate(VirtualReg(2)), Some(X86Reg::Rcx));
    }

    #[test]
    fn test_exhaustion() {
        let config = BackendConfig::new().with_allocation_order(vec![X86Reg::Rbx]);
        let mut alloc = SlotAllocator::new(&config);

        assert_eq!(alloc.allocate(VirtualReg(1)), Some(X86Reg::Rbx));
        assert_eq!(alloc.allocate(VirtualReg(2)), None);
        assert_eq!(alloc.capacity(), 1);
    }

    #[test]
    fn test_release_makes_register_reusable() {
        let config = BackendConfig::new().with_allocation_order(vec![X86Reg::Rbx]);
        let mut alloc = SlotAllocator::new(&config);

        alloc.allocate(VirtualReg(1));
        alloc.release(VirtualReg(1));
        assert_eq!(alloc.location(VirtualReg(1)), None);
        assert!(alloc.is_defined(VirtualReg(1)));
        assert_eq!(alloc.allocate(VirtualReg(2)), Some(X86Reg::Rbx));
    }

    #[test]
    fn test_release_is_noop_without_reuse() {
        let config = BackendConfig::new()
            .with_allocation_order(vec![X86Reg::Rbx])
            .with_reuse_dead_registers(false);
        let mut alloc = SlotAllocator::new(&config);

        alloc.allocate(VirtualReg(1));
        alloc.release(VirtualReg(1));
        assert_eq!(alloc.location(VirtualReg(1)), Some(X86Reg::Rbx));
        assert_eq!(alloc.allocate(VirtualReg(2)), None);
    }

    #[test]
    fn test_transfer_keeps_register_occupied() {
        let config = BackendConfig::new().with_allocation_order(vec![X86Reg::Rsi]);
        let mut alloc = SlotAllocator::new(&config);

        alloc.allocate(VirtualReg(1));
        assert_eq!(
            alloc.transfer(VirtualReg(1), VirtualReg(2)),
            Some(X86Reg::Rsi)
        );
        assert_eq!(alloc.location(VirtualReg(1)), None);
        assert_eq!(alloc.location(VirtualReg(2)), Some(X86Reg::Rsi));

        // Releasing the old owner must not free the new owner's register
        alloc.release(VirtualReg(1));
        assert_eq!(alloc.allocate(VirtualReg(3)), None);
    }
}
