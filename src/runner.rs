//! Result adapters: how a node's result is delivered.
//!
//! A [`Runner`] runs a node with its own wait/check/capture settings and
//! turns the resulting [`Process`] into a value. `node | runner` runs
//! immediately.

use std::fmt;
use std::sync::Arc;

use crate::cmd::{Runnable, Stdio};
use crate::deferred::Deferred;
use crate::error::{PipeError, Result};
use crate::exec::{Check, Process, RunOptions};

type Transform<T> = Arc<dyn Fn(Process) -> Result<T> + Send + Sync>;

pub struct Runner<T> {
    transform: Transform<T>,
    wait: bool,
    check: Deferred<Check>,
    capture: bool,
    // transform reads captured stdout, so capture stays on
    decodes: bool,
}

impl<T> Clone for Runner<T> {
    fn clone(&self) -> Self {
        Self {
            transform: Arc::clone(&self.transform),
            wait: self.wait,
            check: self.check,
            capture: self.capture,
            decodes: self.decodes,
        }
    }
}

impl<T> fmt::Debug for Runner<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runner")
            .field("wait", &self.wait)
            .field("check", &self.check)
            .field("capture", &self.capture)
            .finish_non_exhaustive()
    }
}

impl Runner<Process> {
    /// Hands back the process itself.
    pub fn passthrough() -> Self {
        Self {
            transform: Arc::new(|p: Process| -> Result<Process> { Ok(p) }),
            wait: true,
            check: Deferred::Unspecified,
            capture: false,
            decodes: false,
        }
    }
}

impl<T> Runner<T> {
    pub fn apply<N: Runnable>(&self, node: &N) -> Result<T> {
        let stdout = if self.capture { Deferred::Explicit(Stdio::Pipe) } else { Deferred::Unspecified };
        let opts = RunOptions::new()
            .with_stdout_deferred(stdout)
            .with_check_deferred(self.check)
            .wait(self.wait);
        let process = node.run(opts)?;
        (self.transform)(process)
    }

    pub fn is_waiting(&self) -> bool { self.wait }
    pub fn is_capturing(&self) -> bool { self.capture }
    pub fn check_policy(&self) -> Deferred<Check> { self.check }

    pub fn wait(&self, wait: bool) -> Self { Self { wait, ..self.clone() } }
    pub fn check<C: Into<Check>>(&self, check: C) -> Self { Self { check: Deferred::Explicit(check.into()), ..self.clone() } }

    /// Capture stdout of the final member, overriding its redirection.
    /// Runners that decode output always capture.
    pub fn capture(&self, capture: bool) -> Self { Self { capture: capture || self.decodes, ..self.clone() } }

    /// Deliver the raw process. Does not change capture.
    pub fn from_proc<U: 'static, F>(&self, f: F) -> Runner<U>
    where
        F: Fn(Process) -> U + Send + Sync + 'static,
    {
        self.retarget(raw(f), false)
    }

    /// Deliver captured stdout decoded as UTF-8. Turns capture on.
    pub fn from_str<U: 'static, F>(&self, f: F) -> Runner<U>
    where
        F: Fn(String) -> U + Send + Sync + 'static,
    {
        self.retarget(decoded(f), true)
    }

    /// Deliver captured stdout as bytes. Turns capture on.
    pub fn from_bytes<U: 'static, F>(&self, f: F) -> Runner<U>
    where
        F: Fn(Vec<u8>) -> U + Send + Sync + 'static,
    {
        self.retarget(bytes(f), true)
    }

    /// Switch to the output transform named in `settings`, applying its
    /// wait/check/capture changes too.
    pub fn with<U: 'static>(&self, settings: Settings<U>) -> Result<Runner<U>> {
        self.reconfigure(settings, None)
    }

    /// Like [`Runner::with`], but keeps the current transform when
    /// `settings` names none.
    pub fn configure(&self, settings: Settings<T>) -> Result<Runner<T>>
    where
        T: 'static,
    {
        self.reconfigure(settings, Some(Arc::clone(&self.transform)))
    }

    fn reconfigure<U: 'static>(&self, settings: Settings<U>, current: Option<Transform<U>>) -> Result<Runner<U>> {
        let Settings { from_str, from_bytes, from_proc, wait, check, capture } = settings;
        let transforms = [from_str.is_some(), from_bytes.is_some(), from_proc.is_some()]
            .iter()
            .filter(|set| **set)
            .count();
        if transforms > 1 {
            return Err(PipeError::InvalidConfiguration(
                "at most one of from_str, from_bytes or from_proc may be given".into(),
            ));
        }

        let (transform, decodes) = if let Some(f) = from_str {
            (decoded(f), true)
        } else if let Some(f) = from_bytes {
            (bytes(f), true)
        } else if let Some(f) = from_proc {
            (raw(f), false)
        } else if let Some(t) = current {
            (t, self.decodes)
        } else {
            return Err(PipeError::InvalidConfiguration(
                "with() changes the output type and needs a transform; use configure() to keep the current one".into(),
            ));
        };

        let mut next = self.retarget(transform, decodes);
        if let Deferred::Explicit(c) = capture { next.capture = c || decodes; }
        if let Deferred::Explicit(w) = wait { next.wait = w; }
        next.check = check.or(next.check);
        Ok(next)
    }

    fn retarget<U>(&self, transform: Transform<U>, decodes: bool) -> Runner<U> {
        Runner { transform, wait: self.wait, check: self.check, capture: self.capture || decodes, decodes }
    }
}

fn raw<U: 'static, F>(f: F) -> Transform<U>
where
    F: Fn(Process) -> U + Send + Sync + 'static,
{
    Arc::new(move |p: Process| -> Result<U> { Ok(f(p)) })
}

fn decoded<U: 'static, F>(f: F) -> Transform<U>
where
    F: Fn(String) -> U + Send + Sync + 'static,
{
    Arc::new(move |mut p: Process| -> Result<U> { Ok(f(String::from_utf8(p.read_stdout()?)?)) })
}

fn bytes<U: 'static, F>(f: F) -> Transform<U>
where
    F: Fn(Vec<u8>) -> U + Send + Sync + 'static,
{
    Arc::new(move |mut p: Process| -> Result<U> { Ok(f(p.read_stdout()?)) })
}

type Boxed<A, U> = Box<dyn Fn(A) -> U + Send + Sync>;

/// Bulk reconfiguration for [`Runner::with`] and [`Runner::configure`].
pub struct Settings<U> {
    from_str: Option<Boxed<String, U>>,
    from_bytes: Option<Boxed<Vec<u8>, U>>,
    from_proc: Option<Boxed<Process, U>>,
    wait: Deferred<bool>,
    check: Deferred<Check>,
    capture: Deferred<bool>,
}

impl<U> Default for Settings<U> {
    fn default() -> Self {
        Self {
            from_str: None,
            from_bytes: None,
            from_proc: None,
            wait: Deferred::Unspecified,
            check: Deferred::Unspecified,
            capture: Deferred::Unspecified,
        }
    }
}

impl<U: 'static> Settings<U> {
    pub fn new() -> Self { Self::default() }
    pub fn from_str<F: Fn(String) -> U + Send + Sync + 'static>(mut self, f: F) -> Self { self.from_str = Some(Box::new(f)); self }
    pub fn from_bytes<F: Fn(Vec<u8>) -> U + Send + Sync + 'static>(mut self, f: F) -> Self { self.from_bytes = Some(Box::new(f)); self }
    pub fn from_proc<F: Fn(Process) -> U + Send + Sync + 'static>(mut self, f: F) -> Self { self.from_proc = Some(Box::new(f)); self }
    pub fn wait(mut self, wait: bool) -> Self { self.wait = Deferred::Explicit(wait); self }
    pub fn check<C: Into<Check>>(mut self, check: C) -> Self { self.check = Deferred::Explicit(check.into()); self }
    pub fn capture(mut self, capture: bool) -> Self { self.capture = Deferred::Explicit(capture); self }
}

/// Run and wait; hand back the process.
pub fn run() -> Runner<Process> { Runner::passthrough() }

/// Start without waiting; hand back the process.
pub fn bg() -> Runner<Process> { Runner::passthrough().wait(false) }

/// Run, wait and return stdout as a string.
pub fn capture() -> Runner<String> { run().from_str(|s| s) }
