//! gcsim shell
//!
//! Runs command scripts against a simulated heap, or starts an interactive
//! shell.

use std::io::{self, Write};

use clap::Parser as ClapParser;
use log::debug;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use gcsim::util::size::parse_size;
use gcsim::{Session, SimulatorConfig};

#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Command scripts to run in order
    #[arg(required = false, help = "Files with one command per line")]
    files: Vec<String>,

    /// Heap capacity
    #[arg(
        long,
        default_value = "1GB",
        value_parser = parse_size,
        help = "Capacity, e.g. 1024, 512MB or 2GB"
    )]
    capacity: usize,

    /// Seed for reproducible runs
    #[arg(long, help = "Seed the allocation generator")]
    seed: Option<u64>,

    /// Start the shell after running files (default if no files)
    #[arg(long, help = "Force interactive mode after file execution")]
    repl: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let config = SimulatorConfig {
        capacity: cli.capacity,
        seed: cli.seed,
        ..SimulatorConfig::default()
    };
    debug!("starting with {:?}", config);

    let mut session = match Session::new(&config) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    for filename in &cli.files {
        run_file(&mut session, filename);
    }

    if cli.repl || cli.files.is_empty() {
        run_repl(&mut session);
    }
}

fn run_file(session: &mut Session, filename: &str) {
    let source = match std::fs::read_to_string(filename) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading {}: {}", filename, e);
            std::process::exit(1);
        }
    };

    for (lineno, line) in source.lines().enumerate() {
        match session.eval(line) {
            Ok(output) => print_output(&output),
            Err(e) => {
                eprintln!("{}:{}: Error: {}", filename, lineno + 1, e);
                std::process::exit(1);
            }
        }
    }
}

fn print_output(output: &str) {
    let mut stdout = std::io::stdout().lock();
    if let Err(e) = write_output(&mut stdout, output) {
        eprintln!("Error writing output: {}", e);
    }
}

/// Comments and blank commands evaluate to nothing and print nothing
fn write_output(out: &mut impl Write, output: &str) -> io::Result<()> {
    if output.is_empty() {
        return Ok(());
    }
    writeln!(out, "{}", output)
}

fn run_repl(session: &mut Session) {
    println!("gcsim - mark-and-sweep heap simulator");
    println!("Type 'help' for commands, Ctrl+D to exit.\n");

    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(e) => {
            eprintln!("Error starting line editor: {}", e);
            std::process::exit(1);
        }
    };

    loop {
        match editor.readline("> ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(line.as_str());

                match session.eval(&line) {
                    Ok(output) => print_output(&output),
                    Err(e) => println!("Error: {}", e),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!();
                break;
            }
            Err(e) => {
                eprintln!("Error reading input: {}", e);
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_output_prints_nothing() {
        let mut buf = Vec::new();
        write_output(&mut buf, "").unwrap();
        assert!(buf.is_empty());
    }

    #[test]
    fn test_comment_prints_nothing() {
        let mut session = Session::new(&SimulatorConfig::default()).unwrap();
        let output = session.eval("# just a note").unwrap();
        let mut buf = Vec::new();
        write_output(&mut buf, &output).unwrap();
        assert!(buf.is_empty());
    }

    #[test]
    fn test_output_gets_one_line() {
        let mut buf = Vec::new();
        write_output(&mut buf, "collected 0").unwrap();
        assert_eq!(buf, b"collected 0\n");
    }
}
