//! pipecmd: compose external processes with shell-style operators.
//!
//! Commands are immutable values. `|` pipes, `&` runs the right side only
//! on success, `^` only on failure; `<<` and `>>` redirect. Nothing runs
//! until a node is executed with [`Runnable::run`], one of its shortcuts, or
//! by piping it into a [`Runner`].
//!
//! ```no_run
//! use pipecmd::prelude::*;
//!
//! let words = (sh("echo").arg("b\na") | sh("sort")).output_string()?;
//! assert_eq!(words, "a\nb\n");
//!
//! let _count = sh("ls") | sh("wc").arg("-l") | runner::run().from_str(|s| s.trim().parse::<usize>());
//! # Ok::<(), pipecmd::PipeError>(())
//! ```

pub mod error;
pub mod deferred;
pub mod cmd;
pub mod exec;
pub mod render;
pub mod runner;
pub mod easy;
pub mod macros;
pub mod prelude;

pub use cmd::{Chain, ChainKind, Command, Input, Node, Redirect, Runnable, Stdio};
pub use deferred::Deferred;
pub use easy::{checked, make, sh, CommandDef, Shell};
pub use error::{PipeError, Result};
pub use exec::{Check, Lines, Process, RunOptions, SpawnOptions};
pub use runner::{Runner, Settings};
