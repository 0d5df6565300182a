//! Shared error and diagnostic types used across the compilation pipeline.
//!
//! Fatal conditions end up in `CompileError` and abort the run. Problems the
//! compiler can step over (an unknown word) are `Diagnostic`s: they are
//! logged, collected on the compilation and never stop translation.

use std::io;
use std::path::PathBuf;

use snafu::Snafu;

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CompileError {
  #[snafu(display("unable to read {}: {source}", path.display()))]
  ReadSource { path: PathBuf, source: io::Error },

  #[snafu(display("unable to read source: {source}"))]
  Read { source: io::Error },

  #[snafu(display("unable to write {}: {source}", path.display()))]
  WriteOutput { path: PathBuf, source: io::Error },

  #[snafu(display("{line}:{column}: literal {token} does not fit in 64 bits"))]
  LiteralOutOfRange {
    token: String,
    line: usize,
    column: usize,
  },
}

/// Non-fatal findings reported while compiling.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Diagnostic {
  #[snafu(display("Unrecognized token: {token}"))]
  UnrecognizedToken {
    token: String,
    line: usize,
    column: usize,
  },
}

impl Diagnostic {
  /// 1-based line and column of the offending token.
  pub fn position(&self) -> (usize, usize) {
    match self {
      Diagnostic::UnrecognizedToken { line, column, .. } => (*line, *column),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unrecognized_token_renders_plain_text() {
    let diagnostic = Diagnostic::UnrecognizedToken {
      token: "foo".to_string(),
      line: 3,
      column: 7,
    };
    assert_eq!(diagnostic.to_string(), "Unrecognized token: foo");
    assert_eq!(diagnostic.position(), (3, 7));
  }

  #[test]
  fn out_of_range_literal_points_at_token() {
    let err = CompileError::LiteralOutOfRange {
      token: "99999999999999999999".to_string(),
      line: 1,
      column: 4,
    };
    assert_eq!(
      err.to_string(),
      "1:4: literal 99999999999999999999 does not fit in 64 bits"
    );
  }
}
