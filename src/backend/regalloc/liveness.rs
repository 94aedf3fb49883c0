//! Liveness Analysis
//!
//! This module computes, for a single block, the position of the last read
//! of every virtual register. With one block and no branches a register is
//! live from its definition up to and including that position.

use crate::backend::ir::{Block, VirtualReg};
use std::collections::HashMap;

/// Last-use positions for one block
#[derive(Clone, Debug, Default)]
pub struct LastUse {
    last: HashMap<VirtualReg, usize>,
}

impl LastUse {
    /// Analyze a block in one forward pass
    pub fn analyze(block: &Block) -> Self {
        let mut last = HashMap::new();

        for (index, instr) in block.iter().enumerate() {
            for vreg in instr.uses() {
                last.insert(vreg, index);
            }
        }

        Self { last }
    }

    /// Instruction index of the final read of `vreg`, if it is ever read
    pub fn last_use(&self, vreg: VirtualReg) -> Option<usize> {
        self.last.get(&vreg).copied()
    }

    /// True when no instruction after `index` reads `vreg`
    pub fn dead_after(&self, vreg: VirtualReg, index: usize) -> bool {
        self.last_use(vreg).is_none_or(|last| last <= index)
    }
}
