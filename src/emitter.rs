//! Final assembly: fixed prologue, the generated fragments in order, and
//! the exit sequence.

use std::fs;
use std::path::Path;

use log::debug;
use snafu::ResultExt;

use crate::codegen::Fragment;
use crate::error::{CompileResult, WriteOutputSnafu};

/// Format string shared by every print, plus the entry point. `%rbp` keeps
/// the initial stack pointer so `.s` knows where the program stack starts.
const PROLOGUE: &str = "\
.section .rodata

fmt:
    .asciz \"%ld\\n\"

.section .text
.globl _start
_start:
    mov %rsp, %rbp
";

/// Flush C stdio before the raw `exit` syscall, which skips libc's exit
/// handlers. The stack is realigned for the call since its depth is unknown.
const EPILOGUE: &str = "\
    and $-16, %rsp
    xor %edi, %edi
    call fflush
    mov $60, %rax
    mov $0, %rdi
    syscall
";

/// Ordered fragment builder, joined once by `render`.
#[derive(Debug, Default, Clone)]
pub struct Program {
  fragments: Vec<Fragment>,
}

impl Program {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&mut self, fragment: Fragment) {
    self.fragments.push(fragment);
  }

  pub fn fragment_count(&self) -> usize {
    self.fragments.len()
  }

  pub fn render(&self) -> String {
    let body: usize = self.fragments.iter().map(|f| f.as_str().len() + 1).sum();
    let mut asm = String::with_capacity(PROLOGUE.len() + body + EPILOGUE.len() + 1);
    asm.push_str(PROLOGUE);
    for fragment in &self.fragments {
      asm.push('\n');
      asm.push_str(fragment.as_str());
    }
    asm.push('\n');
    asm.push_str(EPILOGUE);
    asm
  }
}

/// Write the rendered program in one shot, replacing any existing file.
pub fn write_program(asm: &str, path: &Path) -> CompileResult<()> {
  fs::write(path, asm).context(WriteOutputSnafu { path })?;
  debug!("wrote {} bytes to {}", asm.len(), path.display());
  Ok(())
}
