//! Redirection targets and how they are opened at spawn time.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{self, ChildStdout};
use std::sync::Arc;

use crate::cmd::Runnable;
use crate::deferred::Deferred;

/// Where a stream of a command goes (or comes from).
///
/// Paths are opened lazily, once per run. An already-open file is shared and
/// duplicated for every spawn that uses it.
#[derive(Debug, Clone)]
pub enum Stdio {
    Inherit,
    Null,
    Pipe,
    Path(PathBuf),
    File(Arc<File>),
}

impl Default for Stdio {
    fn default() -> Self { Stdio::Inherit }
}

impl Stdio {
    pub fn path<P: Into<PathBuf>>(p: P) -> Self { Stdio::Path(p.into()) }

    pub fn is_null(&self) -> bool { matches!(self, Stdio::Null) }

    /// Open for use as a child's stdin. Paths are opened read-only.
    pub(crate) fn open_input(&self) -> io::Result<process::Stdio> {
        Ok(match self {
            Stdio::Inherit => process::Stdio::inherit(),
            Stdio::Null => process::Stdio::null(),
            Stdio::Pipe => {
                return Err(io::Error::new(io::ErrorKind::InvalidInput, "a pipe has no writer as standard input"));
            }
            Stdio::Path(p) => File::open(p)?.into(),
            Stdio::File(f) => f.try_clone()?.into(),
        })
    }

    /// Open for use as a child's stdout or stderr.
    pub(crate) fn open_output(&self, append: bool) -> io::Result<process::Stdio> {
        Ok(match self {
            Stdio::Inherit => process::Stdio::inherit(),
            Stdio::Null => process::Stdio::null(),
            Stdio::Pipe => process::Stdio::piped(),
            Stdio::Path(p) => {
                let mut opts = OpenOptions::new();
                opts.create(true);
                if append { opts.append(true); } else { opts.write(true).truncate(true); }
                opts.open(p)?.into()
            }
            Stdio::File(f) => f.try_clone()?.into(),
        })
    }
}

impl PartialEq for Stdio {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Stdio::Inherit, Stdio::Inherit) | (Stdio::Null, Stdio::Null) | (Stdio::Pipe, Stdio::Pipe) => true,
            (Stdio::Path(a), Stdio::Path(b)) => a == b,
            (Stdio::File(a), Stdio::File(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// File-first forms: `Stdio::path("in.txt").feed(cmd)` reads like
/// `in.txt > cmd`, `Stdio::Null.receive(cmd)` like `/dev/null < cmd`.
impl Stdio {
    pub fn feed<N: Runnable>(self, node: N) -> N { node.stdin_from(self) }
    pub fn receive<N: Runnable>(self, node: N) -> N { node.stdout_to(self) }
}

impl From<&str> for Stdio {
    fn from(s: &str) -> Self { Stdio::Path(PathBuf::from(s)) }
}

impl From<String> for Stdio {
    fn from(s: String) -> Self { Stdio::Path(PathBuf::from(s)) }
}

impl From<&Path> for Stdio {
    fn from(p: &Path) -> Self { Stdio::Path(p.to_path_buf()) }
}

impl From<PathBuf> for Stdio {
    fn from(p: PathBuf) -> Self { Stdio::Path(p) }
}

impl From<&PathBuf> for Stdio {
    fn from(p: &PathBuf) -> Self { Stdio::Path(p.clone()) }
}

impl From<File> for Stdio {
    fn from(f: File) -> Self { Stdio::File(Arc::new(f)) }
}

impl From<Arc<File>> for Stdio {
    fn from(f: Arc<File>) -> Self { Stdio::File(f) }
}

/// `None` is shorthand for the null device.
impl<T: Into<Stdio>> From<Option<T>> for Stdio {
    fn from(v: Option<T>) -> Self { v.map(Into::into).unwrap_or(Stdio::Null) }
}

/// Standard input handed to a single run: either a redirection target or
/// the live output of a previous stage.
#[derive(Debug)]
pub enum Input {
    Target(Stdio),
    Stream(ChildStdout),
}

impl Input {
    pub(crate) fn open(self) -> io::Result<process::Stdio> {
        match self {
            Input::Target(t) => t.open_input(),
            Input::Stream(s) => Ok(s.into()),
        }
    }

    pub(crate) fn describe(&self) -> String {
        match self {
            Input::Target(t) => describe(t),
            Input::Stream(_) => "previous stage".to_string(),
        }
    }
}

impl From<Stdio> for Input {
    fn from(t: Stdio) -> Self { Input::Target(t) }
}

impl From<ChildStdout> for Input {
    fn from(s: ChildStdout) -> Self { Input::Stream(s) }
}

pub(crate) fn describe(t: &Stdio) -> String {
    match t {
        Stdio::Inherit => "inherit".to_string(),
        Stdio::Null => "null".to_string(),
        Stdio::Pipe => "pipe".to_string(),
        Stdio::Path(p) => p.display().to_string(),
        Stdio::File(_) => "open file".to_string(),
    }
}

/// A set of redirection changes. Unspecified fields leave the command's
/// current setting alone.
#[derive(Debug, Clone, Default)]
pub struct Redirect {
    pub input: Deferred<Stdio>,
    pub output: Deferred<Stdio>,
    pub append: Deferred<bool>,
}

impl Redirect {
    pub fn new() -> Self { Self::default() }
    pub fn input<T: Into<Stdio>>(mut self, t: T) -> Self { self.input = Deferred::Explicit(t.into()); self }
    pub fn output<T: Into<Stdio>>(mut self, t: T) -> Self { self.output = Deferred::Explicit(t.into()); self }
    pub fn append(mut self, append: bool) -> Self { self.append = Deferred::Explicit(append); self }

    pub(crate) fn touches_output(&self) -> bool { self.output.is_explicit() || self.append.is_explicit() }
}
