//! pipecmd::prelude - grab-and-go imports for building and running commands

pub use crate::cmd::{Chain, ChainKind, Command, Node, Redirect, Runnable, Stdio};
pub use crate::deferred::Deferred;
pub use crate::easy::{checked, make, sh, Shell};
pub use crate::error::{PipeError, Result};
pub use crate::exec::{Check, Process, RunOptions};
pub use crate::runner::{self, Runner, Settings};
