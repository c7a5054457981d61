//! Browsing context identifiers.
//!
//! Every root tab gets a fresh [`ContextId`]; tabs opened from it share it.
//! Ids are rendered in the tab strip as short letter labels (`A`, `B`, ..., `Z`, `AA`).

use crate::types::context::ContextId;

/// Most letters a label can hold. Higher-order digits are dropped.
pub const MAX_LABEL_DIGITS: usize = 4;

const ALPHA_DIGITS: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Hands out context ids. Owned by the application, passed to tab creation.
#[derive(Debug, Default)]
pub struct ContextAllocator {
    next: u64,
}

impl ContextAllocator {
    pub fn new() -> Self {
        Self { next: 0 }
    }

    /// Starts counting at `next`. Used to resume a counter.
    pub fn starting_at(next: u64) -> Self {
        Self { next }
    }

    /// Returns the next unused id. Wraps after 2^64 allocations.
    pub fn allocate(&mut self) -> ContextId {
        let id = ContextId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }

    /// Number of ids handed out so far (modulo 2^64).
    pub fn allocated(&self) -> u64 {
        self.next
    }
}

/// Letter label for a context id, most significant letter first.
///
/// The last letter is `id % 26`; each further letter is `((id / 26^k) - 1) % 26`.
/// At most [`MAX_LABEL_DIGITS`] letters are produced.
pub fn format_context_label(id: u64) -> String {
    let mut digits = [0u8; MAX_LABEL_DIGITS];
    let mut len = 0;
    let mut num = id;

    digits[len] = ALPHA_DIGITS[(num % 26) as usize];
    len += 1;
    num /= 26;
    while num > 0 && len < MAX_LABEL_DIGITS {
        digits[len] = ALPHA_DIGITS[((num - 1) % 26) as usize];
        len += 1;
        num /= 26;
    }

    digits[..len].iter().rev().map(|&b| b as char).collect()
}

/// Label decorated for the tab strip, e.g. `"A: "`.
pub fn format_context_tag(id: ContextId) -> String {
    format!("{}: ", format_context_label(id.value()))
}
