//! Unique label identifiers for code blocks that carry their own loops.

use std::fmt;

/// Identifier handed out once per `.s` site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelId(u32);

impl LabelId {
  pub fn index(self) -> u32 {
    self.0
  }

  /// Label at the top of the stack-walk loop.
  pub fn loop_label(self) -> String {
    format!("dots_loop{self}")
  }

  /// Label jumped to once the walk reaches the stack pointer.
  pub fn done_label(self) -> String {
    format!("dots_done{self}")
  }
}

impl fmt::Display for LabelId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "_{}", self.0)
  }
}

/// Monotonic counter scoped to one compilation.
#[derive(Debug, Default)]
pub struct LabelAllocator {
  next: u32,
}

impl LabelAllocator {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn allocate(&mut self) -> LabelId {
    let id = LabelId(self.next);
    self.next += 1;
    id
  }

  /// Number of identifiers handed out so far.
  pub fn allocated(&self) -> u32 {
    self.next
  }
}
