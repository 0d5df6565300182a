//! Maps each token onto the closed instruction set.
//!
//! Digit-only words are literals, a fixed set of eight words are operations
//! and everything else falls through to `Instruction::Unrecognized`. Signed
//! words such as `-1` are not literals and end up unrecognized.

use std::fmt;

use snafu::OptionExt;

use crate::error::{CompileResult, LiteralOutOfRangeSnafu};
use crate::label::{LabelAllocator, LabelId};
use crate::tokenizer::Token;

/// One classified word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
  PushNumber(u64),
  Duplicate,
  Multiply,
  Print,
  Add,
  Swap,
  Nip,
  Tuck,
  StackDump(LabelId),
  Unrecognized(String),
}

/// Slots an instruction pops and then pushes on the runtime stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackEffect {
  pub pops: u8,
  pub pushes: u8,
}

impl StackEffect {
  const fn new(pops: u8, pushes: u8) -> Self {
    Self { pops, pushes }
  }

  /// Net change in stack depth.
  pub fn delta(self) -> i16 {
    i16::from(self.pushes) - i16::from(self.pops)
  }
}

impl fmt::Display for StackEffect {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "( {} -- {} )", self.pops, self.pushes)
  }
}

impl Instruction {
  pub fn stack_effect(&self) -> StackEffect {
    match self {
      Instruction::PushNumber(_) => StackEffect::new(0, 1),
      Instruction::Duplicate => StackEffect::new(1, 2),
      Instruction::Multiply => StackEffect::new(2, 1),
      Instruction::Print => StackEffect::new(1, 0),
      Instruction::Add => StackEffect::new(2, 1),
      Instruction::Swap => StackEffect::new(2, 2),
      Instruction::Nip => StackEffect::new(2, 1),
      Instruction::Tuck => StackEffect::new(2, 3),
      Instruction::StackDump(_) => StackEffect::new(0, 0),
      Instruction::Unrecognized(_) => StackEffect::new(0, 0),
    }
  }
}

fn is_literal(text: &str) -> bool {
  !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

/// Classify a token. `.s` consumes one identifier from `labels`.
///
/// The only failure is a digit-only word too large for 64 bits.
pub fn classify(token: &Token, labels: &mut LabelAllocator) -> CompileResult<Instruction> {
  let text = token.as_str();

  if is_literal(text) {
    let value = text.parse::<u64>().ok().context(LiteralOutOfRangeSnafu {
      token: text,
      line: token.line,
      column: token.column,
    })?;
    return Ok(Instruction::PushNumber(value));
  }

  let instruction = match text {
    "dup" => Instruction::Duplicate,
    "*" => Instruction::Multiply,
    "." => Instruction::Print,
    "+" => Instruction::Add,
    "swap" => Instruction::Swap,
    "nip" => Instruction::Nip,
    "tuck" => Instruction::Tuck,
    ".s" => Instruction::StackDump(labels.allocate()),
    _ => Instruction::Unrecognized(text.to_string()),
  };
  Ok(instruction)
}
