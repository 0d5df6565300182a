//! Lexical analysis: turns a raw byte stream into whitespace-separated words.
//!
//! The tokenizer knows nothing about the vocabulary. It splits on ASCII
//! whitespace and drops line comments, which start at any `/` or `\` and run
//! through the next line feed. A word cut short by a comment marker is still
//! emitted.

use std::io::{self, BufReader, Bytes, Read};

/// A single word of source text together with where it started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
  pub text: String,
  pub line: usize,
  pub column: usize,
}

impl Token {
  pub fn new(text: impl Into<String>, line: usize, column: usize) -> Self {
    Self {
      text: text.into(),
      line,
      column,
    }
  }

  pub fn as_str(&self) -> &str {
    &self.text
  }
}

fn is_separator(byte: u8) -> bool {
  matches!(byte, b' ' | b'\t' | b'\r' | b'\n')
}

fn is_comment_marker(byte: u8) -> bool {
  matches!(byte, b'/' | b'\\')
}

/// Streaming tokenizer over any reader. Yields tokens in source order.
pub struct Tokenizer<R: Read> {
  bytes: Bytes<BufReader<R>>,
  current: String,
  start: (usize, usize),
  line: usize,
  column: usize,
  done: bool,
}

impl<R: Read> Tokenizer<R> {
  pub fn new(reader: R) -> Self {
    Self {
      bytes: BufReader::new(reader).bytes(),
      current: String::new(),
      start: (1, 1),
      line: 1,
      column: 1,
      done: false,
    }
  }

  fn next_byte(&mut self) -> Option<io::Result<u8>> {
    let byte = self.bytes.next()?;
    if let Ok(b) = byte {
      if b == b'\n' {
        self.line += 1;
        self.column = 1;
      } else {
        self.column += 1;
      }
    }
    Some(byte)
  }

  /// Hand out the word accumulated so far, if any.
  fn flush(&mut self) -> Option<Token> {
    if self.current.is_empty() {
      return None;
    }
    let text = std::mem::take(&mut self.current);
    Some(Token::new(text, self.start.0, self.start.1))
  }

  /// Discard everything up to and including the next line feed.
  fn skip_comment(&mut self) -> io::Result<()> {
    while let Some(byte) = self.next_byte() {
      if byte? == b'\n' {
        break;
      }
    }
    Ok(())
  }
}

impl<R: Read> Iterator for Tokenizer<R> {
  type Item = io::Result<Token>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.done {
      return None;
    }

    loop {
      let position = (self.line, self.column);
      let byte = match self.next_byte() {
        Some(Ok(byte)) => byte,
        Some(Err(err)) => {
          self.done = true;
          return Some(Err(err));
        }
        None => {
          self.done = true;
          return self.flush().map(Ok);
        }
      };

      if is_comment_marker(byte) {
        let pending = self.flush();
        if let Err(err) = self.skip_comment() {
          self.done = true;
          return Some(Err(err));
        }
        if let Some(token) = pending {
          return Some(Ok(token));
        }
        continue;
      }

      if is_separator(byte) {
        if let Some(token) = self.flush() {
          return Some(Ok(token));
        }
        continue;
      }

      if self.current.is_empty() {
        self.start = position;
      }
      // Bytes map onto chars one-to-one so any input tokenizes.
      self.current.push(char::from(byte));
    }
  }
}

/// Read the whole stream into a token vector.
pub fn tokenize<R: Read>(reader: R) -> io::Result<Vec<Token>> {
  Tokenizer::new(reader).collect()
}

/// Tokenize an in-memory source.
pub fn tokenize_bytes(source: &[u8]) -> Vec<Token> {
  // Reading from a slice never fails.
  tokenize(source).unwrap_or_default()
}
