//! Crate root: wires together the compilation pipeline.
//!
//! Each stage is small and can be used on its own:
//! - `tokenizer` splits a byte stream into words and drops line comments.
//! - `classifier` maps each word onto the closed `Instruction` set.
//! - `label` hands out unique identifiers for `.s` loops.
//! - `codegen` lowers instructions into x86-64 AT&T fragments.
//! - `emitter` wraps the fragments in the fixed prologue and exit sequence.
//! - `error` holds fatal errors and non-fatal diagnostics.

pub mod classifier;
pub mod codegen;
pub mod emitter;
pub mod error;
pub mod label;
pub mod tokenizer;

use std::fs::File;
use std::io::Read;
use std::path::Path;

use snafu::ResultExt;

pub use classifier::{Instruction, StackEffect};
pub use codegen::{CodeGenerator, Fragment};
pub use emitter::Program;
pub use error::{CompileError, CompileResult, Diagnostic};

/// Name of the artifact the command-line driver writes.
pub const OUTPUT_FILE: &str = "code.s";

/// Result of one compilation.
#[derive(Debug, Clone)]
pub struct Compilation {
  pub assembly: String,
  pub diagnostics: Vec<Diagnostic>,
}

fn compile_tokens(tokens: &[tokenizer::Token]) -> CompileResult<Compilation> {
  let mut generator = CodeGenerator::new();
  for token in tokens {
    generator.lower(token)?;
  }
  let (program, diagnostics) = generator.finish();
  Ok(Compilation {
    assembly: program.render(),
    diagnostics,
  })
}

/// Compile everything readable from `reader`.
pub fn compile<R: Read>(reader: R) -> CompileResult<Compilation> {
  let tokens = tokenizer::tokenize(reader).context(error::ReadSnafu)?;
  compile_tokens(&tokens)
}

/// Compile a source string into AT&T assembly.
pub fn compile_source(source: &str) -> CompileResult<Compilation> {
  compile_tokens(&tokenizer::tokenize_bytes(source.as_bytes()))
}

/// Compile `source` and write the assembly to `output`.
///
/// Nothing is written if reading or classification fails.
pub fn compile_file(source: &Path, output: &Path) -> CompileResult<Compilation> {
  let file = File::open(source).context(error::ReadSourceSnafu { path: source })?;
  let tokens = tokenizer::tokenize(file).context(error::ReadSourceSnafu { path: source })?;
  let compilation = compile_tokens(&tokens)?;
  emitter::write_program(&compilation.assembly, output)?;
  Ok(compilation)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn compiles_from_reader() {
    let compilation = compile(&b"42 ."[..]).unwrap();
    assert!(compilation.assembly.contains("push $42"));
    assert!(compilation.diagnostics.is_empty());
  }

  #[test]
  fn unknown_words_are_reported_once_and_skipped() {
    let compilation = compile_source("foo 1 .").unwrap();
    assert_eq!(compilation.diagnostics.len(), 1);
    assert_eq!(
      compilation.diagnostics[0].to_string(),
      "Unrecognized token: foo"
    );
    assert!(!compilation.assembly.contains("foo"));
    assert!(compilation.assembly.contains("push $1"));
    assert!(compilation.assembly.contains("call printf"));
  }

  #[test]
  fn signed_literals_are_unrecognized() {
    let compilation = compile_source("-1 +2").unwrap();
    let tokens: Vec<_> = compilation
      .diagnostics
      .iter()
      .map(|d| match d {
        Diagnostic::UnrecognizedToken { token, .. } => token.as_str(),
      })
      .collect();
    assert_eq!(tokens, ["-1", "+2"]);
  }

  #[test]
  fn compilations_do_not_share_labels() {
    let first = compile_source(".s .s").unwrap();
    let second = compile_source(".s .s").unwrap();
    assert_eq!(first.assembly, second.assembly);
    assert!(second.assembly.contains("dots_loop_0:"));
    assert!(second.assembly.contains("dots_loop_1:"));
    assert!(!second.assembly.contains("dots_loop_2"));
  }

  #[test]
  fn comments_do_not_reach_the_output() {
    let compilation = compile_source("3 4 + \\ nip tuck\n.").unwrap();
    assert!(compilation.diagnostics.is_empty());
    assert!(!compilation.assembly.contains("add $8, %rsp"));
  }

  #[test]
  fn oversized_literal_aborts() {
    let err = compile_source("1 99999999999999999999 .").unwrap_err();
    assert!(matches!(err, CompileError::LiteralOutOfRange { column: 3, .. }));
  }

  struct FailingReader;

  impl Read for FailingReader {
    fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
      Err(std::io::Error::other("device gone"))
    }
  }

  #[test]
  fn reader_failure_is_fatal() {
    let err = compile(FailingReader).unwrap_err();
    assert!(matches!(err, CompileError::Read { .. }));
    assert_eq!(err.to_string(), "unable to read source: device gone");
  }

  #[test]
  fn missing_source_file_is_fatal() {
    let dir = std::env::temp_dir().join(format!("forthc-lib-{}", std::process::id()));
    let output = dir.join(OUTPUT_FILE);
    let err = compile_file(&dir.join("missing.fs"), &output).unwrap_err();
    assert!(matches!(err, CompileError::ReadSource { .. }));
    assert!(!output.exists());
  }

  #[test]
  fn compile_file_writes_artifact() {
    let dir = std::env::temp_dir().join(format!("forthc-lib-write-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let source = dir.join("prog.fs");
    let output = dir.join(OUTPUT_FILE);
    std::fs::write(&source, "5 dup * .\n").unwrap();

    let compilation = compile_file(&source, &output).unwrap();
    let written = std::fs::read_to_string(&output).unwrap();
    assert_eq!(written, compilation.assembly);
    assert!(written.contains("imul %rbx, %rcx"));

    std::fs::remove_dir_all(&dir).unwrap();
  }
}
