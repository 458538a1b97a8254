//! Label allocation for generated instructions.

use std::collections::BTreeSet;

/// Hands out `IL_nnnn` labels that collide with nothing already used in a method.
///
/// Every label handed out is recorded, so repeated calls never return the same label twice.
#[derive(Debug, Clone, Default)]
pub struct LabelAllocator {
    known: BTreeSet<String>,
    cursor: u32,
}

impl LabelAllocator {
    /// Creates an allocator that avoids `known`.
    #[must_use]
    pub fn new(known: BTreeSet<String>) -> Self {
        LabelAllocator { known, cursor: 0 }
    }

    /// The next unused label, searching upward from `IL_0001`.
    pub fn next_label(&mut self) -> String {
        loop {
            self.cursor += 1;
            let label = format!("IL_{:04}", self.cursor);
            if self.known.insert(label.clone()) {
                return label;
            }
        }
    }

    /// Returns `true` if `label` is in use.
    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.known.contains(label)
    }
}
