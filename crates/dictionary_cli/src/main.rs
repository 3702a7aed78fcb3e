mod logger;
mod shell;

use std::error::Error;
use std::io;
use std::path::PathBuf;

use clap::Parser;

use crate::logger::initialize_logger;
use crate::shell::{Shell, ShellConfig};

/// English-Ukrainian dictionary kept in an unbalanced binary search tree.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Dictionary file, one `word|translation|count` line per entry.
    #[arg(short, long, default_value = "dictionary.txt")]
    file: PathBuf,

    /// Start from the sample words and skip the implicit save on exit.
    #[arg(long)]
    in_memory: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    initialize_logger(args.verbose);

    let config = ShellConfig {
        file: args.file,
        persist: !args.in_memory,
    };
    let stdin = io::stdin();
    let stdout = io::stdout();
    Shell::new(stdin.lock(), stdout.lock(), config).run()?;
    Ok(())
}
