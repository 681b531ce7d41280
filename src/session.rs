//! Command session
//!
//! A `Session` owns one simulated heap and evaluates text commands against
//! it, one line at a time. It is the main entry point for front ends: the
//! `gcsim` binary feeds it script files and interactive input.

use std::str::FromStr;

use rand::Rng;
use rand::rngs::StdRng;
use thiserror::Error;

use crate::config::SimulatorConfig;
use crate::error::HeapError;
use crate::gc::{HeapSimulator, MemoryObject};
use crate::util::size::{Preset, SizeError, format_size, parse_size};

/// Error from evaluating a command line
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unknown command '{0}', try 'help'")]
    UnknownCommand(String),
    #[error("'{0}' needs a size argument")]
    MissingArgument(&'static str),
    #[error("unexpected argument '{0}'")]
    UnexpectedArgument(String),
    #[error(transparent)]
    InvalidSize(#[from] SizeError),
    #[error(transparent)]
    Heap(#[from] HeapError),
}

/// A parsed command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Allocate an object of the given size
    Alloc(usize),
    /// Run a collection
    Collect,
    /// Reset with the current capacity
    Clear,
    /// Reset with a new capacity
    Reset(usize),
    /// Print the snapshot summary
    Stats,
    /// List live objects
    Objects,
    /// List size presets
    Presets,
    Help,
}

impl FromStr for Command {
    type Err = SessionError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };

        let no_args = |cmd: Command| -> Result<Command, SessionError> {
            if rest.is_empty() {
                Ok(cmd)
            } else {
                Err(SessionError::UnexpectedArgument(rest.to_string()))
            }
        };
        let sized = |what: &'static str| -> Result<usize, SessionError> {
            if rest.is_empty() {
                Err(SessionError::MissingArgument(what))
            } else {
                Ok(parse_size(rest)?)
            }
        };

        match name.to_ascii_lowercase().as_str() {
            "alloc" | "a" => Ok(Command::Alloc(sized("alloc")?)),
            "gc" | "collect" => no_args(Command::Collect),
            "clear" => no_args(Command::Clear),
            "reset" => Ok(Command::Reset(sized("reset")?)),
            "stats" | "state" => no_args(Command::Stats),
            "objects" | "ls" => no_args(Command::Objects),
            "presets" => no_args(Command::Presets),
            "help" | "?" => no_args(Command::Help),
            _ => Err(SessionError::UnknownCommand(name.to_string())),
        }
    }
}

const HELP: &str = "\
commands:
  alloc <size|preset>   allocate an object (a)
  gc                    run mark-and-sweep (collect)
  clear                 drop everything, keep capacity
  reset <size>          drop everything, set a new capacity
  stats                 memory summary (state)
  objects               list live objects (ls)
  presets               list size presets
  help                  this text
sizes: 100, 100MB, 2GB or a preset name";

/// Owns a heap and evaluates commands against it
pub struct Session<R = StdRng> {
    heap: HeapSimulator<R>,
}

impl Session<StdRng> {
    pub fn new(config: &SimulatorConfig) -> Result<Self, HeapError> {
        Ok(Session {
            heap: HeapSimulator::from_config(config)?,
        })
    }
}

impl<R> Session<R> {
    pub fn with_heap(heap: HeapSimulator<R>) -> Self {
        Session { heap }
    }

    pub fn heap(&self) -> &HeapSimulator<R> {
        &self.heap
    }
}

impl<R: Rng> Session<R> {
    /// Evaluate one line and return the text to show
    ///
    /// Blank lines and `#` comments produce an empty string. Running out of
    /// memory is reported in the output, not as an error.
    pub fn eval(&mut self, line: &str) -> Result<String, SessionError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(String::new());
        }
        let command = line.parse::<Command>()?;
        self.execute(command)
    }

    /// Execute a parsed command
    pub fn execute(&mut self, command: Command) -> Result<String, SessionError> {
        match command {
            Command::Alloc(size) => match self.heap.allocate(size) {
                Ok(id) => match self.heap.object(id) {
                    Some(obj) => Ok(format!(
                        "allocated {}",
                        describe(obj, self.heap.roots().contains(&id))
                    )),
                    None => Ok(format!("allocated {}", id)),
                },
                Err(HeapError::OutOfMemory {
                    requested,
                    available,
                }) => Ok(format!(
                    "Failed to allocate memory: Memory full! (requested {}, {} free)",
                    format_size(requested),
                    format_size(available)
                )),
                Err(e) => Err(e.into()),
            },
            Command::Collect => {
                let report = self.heap.collect();
                Ok(format!(
                    "collected: freed {} objects ({}), {} live",
                    report.freed_objects,
                    format_size(report.freed_bytes),
                    self.heap.object_count()
                ))
            }
            Command::Clear => {
                self.heap.clear();
                Ok("Memory cleared successfully".to_string())
            }
            Command::Reset(capacity) => {
                self.heap.reset(capacity)?;
                Ok(format!("heap reset to {}", format_size(capacity)))
            }
            Command::Stats => Ok(self.heap.snapshot().to_string()),
            Command::Objects => Ok(self.list_objects()),
            Command::Presets => Ok(Preset::ALL
                .iter()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join("\n")),
            Command::Help => Ok(HELP.to_string()),
        }
    }

    fn list_objects(&self) -> String {
        let snap = self.heap.snapshot();
        if snap.object_count() == 0 {
            return "(no objects)".to_string();
        }
        let mut out = String::new();
        for obj in snap.objects() {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&describe(obj, snap.is_root(obj.id())));
        }
        out
    }
}

fn describe(obj: &MemoryObject, root: bool) -> String {
    let mut line = format!("{} {}", obj.id(), format_size(obj.size()));
    if !obj.references().is_empty() {
        let refs: Vec<String> = obj.references().iter().map(|r| r.to_string()).collect();
        line.push_str(&format!(" -> [{}]", refs.join(", ")));
    }
    if root {
        line.push_str(" root");
    }
    line.push_str(if obj.is_reachable() {
        " reachable"
    } else {
        " unreachable"
    });
    line
}
