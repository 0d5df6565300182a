use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use forthc::OUTPUT_FILE;

/// Compile a Forth source file into x86-64 assembly (written to code.s).
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
  /// Forth source file to compile
  #[clap(value_parser)]
  source: PathBuf,
}

fn init_logging() {
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
    .format(|buf, record| writeln!(buf, "{}", record.args()))
    .init();
}

fn main() {
  init_logging();
  let args = Args::parse();

  let compilation = match forthc::compile_file(&args.source, Path::new(OUTPUT_FILE)) {
    Ok(compilation) => compilation,
    Err(err) => {
      eprintln!("{err}");
      process::exit(1);
    }
  };

  // Unknown words are always reported, whatever the log filter says.
  for diagnostic in &compilation.diagnostics {
    let (line, column) = diagnostic.position();
    eprintln!("{}:{line}:{column}: {diagnostic}", args.source.display());
  }
}
