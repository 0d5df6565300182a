//! Code generation: lower classified instructions into AT&T x86-64 assembly.
//!
//! There is no operand stack at compile time. Every word works directly on
//! the machine stack with `push`/`pop` of 8-byte slots, and the frame base
//! `%rbp` remembers where the program stack began so `.s` can walk it.

use std::fmt;

use log::debug;

use crate::classifier::{self, Instruction};
use crate::emitter::Program;
use crate::error::{CompileResult, Diagnostic, UnrecognizedTokenSnafu};
use crate::label::{LabelAllocator, LabelId};
use crate::tokenizer::Token;

/// Assembly text produced for a single instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment(String);

impl Fragment {
  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for Fragment {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// Emit the fragment for an instruction. Unrecognized words have none.
pub fn generate(instruction: &Instruction) -> Option<Fragment> {
  let mut asm = String::new();
  match instruction {
    Instruction::PushNumber(value) => emit_push(*value, &mut asm),
    Instruction::Duplicate => {
      asm.push_str("    pop %rax\n");
      asm.push_str("    push %rax\n");
      asm.push_str("    push %rax\n");
    }
    Instruction::Multiply => {
      asm.push_str("    pop %rbx\n");
      asm.push_str("    pop %rcx\n");
      asm.push_str("    imul %rbx, %rcx\n");
      asm.push_str("    push %rcx\n");
    }
    Instruction::Print => {
      asm.push_str("    pop %rsi\n");
      emit_printf(&mut asm);
    }
    Instruction::Add => {
      asm.push_str("    pop %rbx\n");
      asm.push_str("    pop %rax\n");
      asm.push_str("    add %rbx, %rax\n");
      asm.push_str("    push %rax\n");
    }
    Instruction::Swap => {
      asm.push_str("    pop %rax\n");
      asm.push_str("    pop %rbx\n");
      asm.push_str("    push %rax\n");
      asm.push_str("    push %rbx\n");
    }
    Instruction::Nip => {
      asm.push_str("    pop %rax\n");
      asm.push_str("    add $8, %rsp\n");
      asm.push_str("    push %rax\n");
    }
    Instruction::Tuck => {
      asm.push_str("    pop %rax\n");
      asm.push_str("    pop %rbx\n");
      asm.push_str("    push %rax\n");
      asm.push_str("    push %rbx\n");
      asm.push_str("    push %rax\n");
    }
    Instruction::StackDump(id) => emit_stack_dump(*id, &mut asm),
    Instruction::Unrecognized(_) => return None,
  }
  Some(Fragment(asm))
}

/// `push` only takes a sign-extended 32-bit immediate; wider literals go
/// through `%rax`.
fn emit_push(value: u64, asm: &mut String) {
  if value <= i32::MAX as u64 {
    asm.push_str(&format!("    push ${value}\n"));
  } else {
    asm.push_str(&format!("    movabs ${value}, %rax\n"));
    asm.push_str("    push %rax\n");
  }
}

/// Call `printf(fmt, %rsi)`. `%al` holds the vector register count. The
/// program stack may be at any depth, so the call runs on a 16-byte aligned
/// `%rsp` with the real one kept in callee-saved `%r12`.
fn emit_printf(asm: &mut String) {
  asm.push_str("    lea fmt(%rip), %rdi\n");
  asm.push_str("    xor %rax, %rax\n");
  asm.push_str("    mov %rsp, %r12\n");
  asm.push_str("    and $-16, %rsp\n");
  asm.push_str("    call printf\n");
  asm.push_str("    mov %r12, %rsp\n");
}

/// Walk from the first pushed slot (`%rbp - 8`) down to `%rsp`, printing
/// each value. The scan pointer in `%rbx` is parked on the stack across each
/// `printf` call.
fn emit_stack_dump(id: LabelId, asm: &mut String) {
  let loop_label = id.loop_label();
  let done_label = id.done_label();

  asm.push_str("    mov %rbp, %rbx\n");
  asm.push_str("    sub $8, %rbx\n");
  asm.push_str(&format!("{loop_label}:\n"));
  asm.push_str("    cmp %rsp, %rbx\n");
  asm.push_str(&format!("    jl {done_label}\n"));
  asm.push_str("    mov (%rbx), %rsi\n");
  asm.push_str("    push %rbx\n");
  emit_printf(asm);
  asm.push_str("    pop %rbx\n");
  asm.push_str("    sub $8, %rbx\n");
  asm.push_str(&format!("    jmp {loop_label}\n"));
  asm.push_str(&format!("{done_label}:\n"));
}

/// Per-compilation context: owns the label allocator, the fragments emitted
/// so far and the diagnostics raised along the way.
#[derive(Debug, Default)]
pub struct CodeGenerator {
  labels: LabelAllocator,
  program: Program,
  diagnostics: Vec<Diagnostic>,
}

impl CodeGenerator {
  pub fn new() -> Self {
    Self::default()
  }

  /// Classify one token and append its fragment.
  pub fn lower(&mut self, token: &Token) -> CompileResult<()> {
    let instruction = classifier::classify(token, &mut self.labels)?;
    debug!(
      "{}:{}: {} -> {instruction:?} {}",
      token.line,
      token.column,
      token.as_str(),
      instruction.stack_effect()
    );

    match generate(&instruction) {
      Some(fragment) => self.program.push(fragment),
      None => {
        let diagnostic = UnrecognizedTokenSnafu {
          token: token.as_str(),
          line: token.line,
          column: token.column,
        }
        .build();
        self.diagnostics.push(diagnostic);
      }
    }
    Ok(())
  }

  /// Hand back the assembled program and everything reported while building it.
  pub fn finish(self) -> (Program, Vec<Diagnostic>) {
    debug!(
      "lowered {} fragments, {} stack dumps, {} diagnostics",
      self.program.fragment_count(),
      self.labels.allocated(),
      self.diagnostics.len()
    );
    (self.program, self.diagnostics)
  }
}
