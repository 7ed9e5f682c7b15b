//! Execution options and the spawn primitive.

pub(crate) mod process;

pub use process::{Lines, Process, Stdout};

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::Command as StdCommand;

use crate::cmd::{Input, Stdio};
use crate::deferred::Deferred;
use crate::error::{PipeError, Result};

/// When an exit code turns into an error. Only applied to waited runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Check {
    #[default]
    Never,
    Success,
    Code(i32),
}

impl Check {
    pub fn accepts(self, code: i32) -> bool {
        match self {
            Check::Never => true,
            Check::Success => code == 0,
            Check::Code(n) => code == n,
        }
    }

    pub(crate) fn verify(self, code: i32, command: &dyn fmt::Display) -> Result<()> {
        if self.accepts(code) {
            return Ok(());
        }
        Err(PipeError::CommandFailed { code, command: command.to_string() })
    }
}

impl From<bool> for Check {
    fn from(b: bool) -> Self { if b { Check::Success } else { Check::Never } }
}

impl From<i32> for Check {
    fn from(n: i32) -> Self { Check::Code(n) }
}

/// Passthrough settings for the spawned process.
#[derive(Debug, Clone, Default)]
pub struct SpawnOptions {
    pub env: BTreeMap<OsString, OsString>,
    pub cwd: Option<PathBuf>,
    pub stderr: Stdio,
}

/// Per-call settings for [`Runnable::run`](crate::Runnable::run).
///
/// `stdin`, `stdout`, `append` and `check` default to unspecified, meaning
/// the node's own configuration applies. `wait` defaults to true.
#[derive(Debug)]
pub struct RunOptions {
    pub(crate) stdin: Deferred<Input>,
    pub(crate) stdout: Deferred<Stdio>,
    pub(crate) append: Deferred<bool>,
    pub(crate) wait: bool,
    pub(crate) check: Deferred<Check>,
    // default supplied by the nearest enclosing chain
    pub(crate) inherited_check: Deferred<Check>,
    pub(crate) spawn: SpawnOptions,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            stdin: Deferred::Unspecified,
            stdout: Deferred::Unspecified,
            append: Deferred::Unspecified,
            wait: true,
            check: Deferred::Unspecified,
            inherited_check: Deferred::Unspecified,
            spawn: SpawnOptions::default(),
        }
    }
}

impl RunOptions {
    pub fn new() -> Self { Self::default() }

    pub fn stdin<I: Into<Input>>(mut self, input: I) -> Self { self.stdin = Deferred::Explicit(input.into()); self }
    pub fn stdout<T: Into<Stdio>>(mut self, target: T) -> Self { self.stdout = Deferred::Explicit(target.into()); self }
    pub fn append(mut self, append: bool) -> Self { self.append = Deferred::Explicit(append); self }
    pub fn wait(mut self, wait: bool) -> Self { self.wait = wait; self }
    pub fn check<C: Into<Check>>(mut self, check: C) -> Self { self.check = Deferred::Explicit(check.into()); self }

    pub fn stderr<T: Into<Stdio>>(mut self, target: T) -> Self { self.spawn.stderr = target.into(); self }
    pub fn cwd<P: Into<PathBuf>>(mut self, dir: P) -> Self { self.spawn.cwd = Some(dir.into()); self }
    pub fn env<K: AsRef<OsStr>, V: AsRef<OsStr>>(mut self, key: K, val: V) -> Self {
        self.spawn.env.insert(key.as_ref().to_owned(), val.as_ref().to_owned());
        self
    }

    pub(crate) fn with_stdout_deferred(mut self, stdout: Deferred<Stdio>) -> Self { self.stdout = stdout; self }
    pub(crate) fn with_check_deferred(mut self, check: Deferred<Check>) -> Self { self.check = check; self }

    /// Options for a chain member that is not the final one: same check,
    /// inherited defaults and spawn extras; no stdio of its own.
    pub(crate) fn member(&self) -> RunOptions {
        RunOptions {
            check: self.check,
            inherited_check: self.inherited_check,
            spawn: self.spawn.clone(),
            ..RunOptions::default()
        }
    }
}

/// Spawn `program` with fully resolved stdio.
pub(crate) fn spawn(
    program: &OsStr,
    args: &[OsString],
    stdin: Input,
    stdout: &Stdio,
    append: bool,
    opts: &SpawnOptions,
) -> io::Result<std::process::Child> {
    tracing::debug!(
        program = %program.to_string_lossy(),
        args = ?args,
        stdin = %stdin.describe(),
        stdout = %crate::cmd::stdio::describe(stdout),
        append,
        "spawning"
    );
    let mut cmd = StdCommand::new(program);
    cmd.args(args)
        .stdin(stdin.open()?)
        .stdout(stdout.open_output(append)?)
        .stderr(opts.stderr.open_output(false)?)
        .envs(&opts.env);
    if let Some(dir) = &opts.cwd {
        cmd.current_dir(dir);
    }
    cmd.spawn()
}
