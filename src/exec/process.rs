use std::io::{self, BufRead, BufReader, Cursor, Read};
use std::process::{Child, ChildStdout, ExitStatus};

use crate::cmd::Input;
use crate::error::{PipeError, Result};
use crate::exec::Check;

/// Captured standard output of a [`Process`].
///
/// Live until the process is waited on; after that the remaining output has
/// been drained into memory and is still readable.
#[derive(Debug)]
pub enum Stdout {
    Live(ChildStdout),
    Buffered(Cursor<Vec<u8>>),
}

impl Read for Stdout {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Stdout::Live(s) => s.read(buf),
            Stdout::Buffered(c) => c.read(buf),
        }
    }
}

/// Handle to a spawned command.
///
/// For a pipeline this is the final stage; earlier stages are kept as
/// `upstream` and reaped by [`Process::wait`].
#[derive(Debug)]
pub struct Process {
    child: Child,
    command: String,
    check: Check,
    stdout: Option<Stdout>,
    status: Option<ExitStatus>,
    upstream: Vec<Process>,
}

impl Process {
    pub(crate) fn new(mut child: Child, command: String, check: Check) -> Self {
        let stdout = child.stdout.take().map(Stdout::Live);
        Self { child, command, check, stdout, status: None, upstream: Vec::new() }
    }

    pub fn pid(&self) -> u32 { self.child.id() }

    /// Rendered form of the command that produced this process.
    pub fn command(&self) -> &str { &self.command }

    /// Exit code once known. Does not block.
    pub fn returncode(&self) -> Option<i32> { self.status.map(exit_code) }

    /// Check whether the process has exited without blocking.
    pub fn poll(&mut self) -> io::Result<Option<i32>> {
        if self.status.is_none() {
            self.status = self.child.try_wait()?;
        }
        Ok(self.returncode())
    }

    /// Block until the process (and any upstream stages) exit.
    ///
    /// A piped stdout is read to the end first and kept in memory.
    pub fn wait(&mut self) -> io::Result<i32> {
        if let Some(Stdout::Live(live)) = &mut self.stdout {
            let mut buf = Vec::new();
            live.read_to_end(&mut buf)?;
            self.stdout = Some(Stdout::Buffered(Cursor::new(buf)));
        }
        let code = match self.status {
            Some(status) => exit_code(status),
            None => {
                let status = self.child.wait()?;
                self.status = Some(status);
                exit_code(status)
            }
        };
        for stage in &mut self.upstream {
            stage.wait()?;
        }
        Ok(code)
    }

    /// Apply the check policy resolved when this process was started.
    pub fn check(&self) -> Result<()> {
        match self.returncode() {
            Some(code) => self.check.verify(code, &self.command),
            None => Ok(()),
        }
    }

    /// Wait, then apply the resolved check policy.
    pub fn wait_checked(&mut self) -> Result<i32> {
        let code = self.wait()?;
        self.check.verify(code, &self.command)?;
        Ok(code)
    }

    pub fn kill(&mut self) -> io::Result<()> { self.child.kill() }

    /// Kill this process and every upstream stage still running.
    pub(crate) fn kill_all(&mut self) {
        for stage in &mut self.upstream {
            stage.kill_all();
        }
        if self.status.is_none() {
            if let Err(e) = self.child.kill() {
                tracing::debug!(command = %self.command, "kill failed: {}", e);
            }
        }
    }

    pub fn stdout(&mut self) -> Option<&mut Stdout> { self.stdout.as_mut() }

    /// Take ownership of captured output.
    pub fn take_stdout(&mut self) -> Option<Stdout> { self.stdout.take() }

    /// Read all remaining captured output. Empty if stdout was not captured.
    pub fn read_stdout(&mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        if let Some(out) = &mut self.stdout {
            out.read_to_end(&mut buf)?;
        }
        Ok(buf)
    }

    /// Earlier stages of a pipeline ending in this process.
    pub fn upstream(&self) -> &[Process] { &self.upstream }

    pub(crate) fn adopt_upstream(&mut self, mut stages: Vec<Process>) {
        stages.append(&mut self.upstream);
        self.upstream = stages;
    }

    /// Hand captured output to the next pipeline stage. Anything that is not
    /// a live stream becomes an empty input.
    pub(crate) fn take_stdin_for_next(&mut self) -> Input {
        match self.stdout.take() {
            Some(Stdout::Live(s)) => Input::Stream(s),
            _ => Input::Target(crate::cmd::Stdio::Null),
        }
    }
}

/// Wait on pipeline stages after the stage reading from them is done.
pub(crate) fn reap(stages: &mut [Process]) {
    for stage in stages {
        if let Err(e) = stage.wait() {
            tracing::warn!(command = %stage.command, "failed to reap pipeline stage: {}", e);
        }
    }
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status.code().or_else(|| status.signal().map(|s| -s)).unwrap_or(-1)
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

/// Line-by-line output of a running command, each line keeping its newline.
///
/// The process is reaped once output is exhausted; a failed check is
/// reported as a final error item. Dropping the iterator early kills and
/// reaps the process and its pipeline stages.
#[derive(Debug)]
pub struct Lines {
    process: Process,
    reader: Option<BufReader<Stdout>>,
}

impl Lines {
    pub(crate) fn new(mut process: Process) -> Self {
        let reader = process.take_stdout().map(BufReader::new);
        Self { process, reader }
    }

    pub fn process(&self) -> &Process { &self.process }
}

impl Iterator for Lines {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let reader = self.reader.as_mut()?;
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) => {
                self.reader = None;
                match self.process.wait_checked() {
                    Ok(_) => None,
                    Err(e) => Some(Err(e)),
                }
            }
            Ok(_) => Some(Ok(line)),
            Err(e) => {
                self.reader = None;
                Some(Err(PipeError::from(e)))
            }
        }
    }
}

impl Drop for Lines {
    fn drop(&mut self) {
        if self.reader.take().is_some() {
            self.process.kill_all();
        }
        if let Err(e) = self.process.wait() {
            tracing::warn!(command = %self.process.command, "failed to reap process: {}", e);
        }
    }
}
