//! Ordered compositions of nodes: pipelines and `&&` / `||` sequences.

use std::fmt;

use crate::cmd::{Node, Redirect, Runnable, Stdio};
use crate::deferred::Deferred;
use crate::error::{PipeError, Result};
use crate::exec::{process, Check, Process, RunOptions};
use crate::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainKind {
    /// `a | b`: stdout of each member feeds stdin of the next.
    Pipe,
    /// `a && b`: run the next member only if the previous exited 0.
    AndThen,
    /// `a || b`: run the next member only if the previous exited non-zero.
    OrElse,
}

impl ChainKind {
    pub fn operator(self) -> &'static str {
        match self {
            ChainKind::Pipe => "|",
            ChainKind::AndThen => "&&",
            ChainKind::OrElse => "||",
        }
    }
}

/// A non-empty sequence of nodes run under one [`ChainKind`].
///
/// Redirecting a chain's input touches only its first member; redirecting
/// output touches only its last.
#[derive(Debug, Clone)]
pub struct Chain {
    kind: ChainKind,
    members: Vec<Node>,
    check: Deferred<Check>,
}

impl Chain {
    /// Combine `left` and `right`. A chain of the same kind on the left
    /// absorbs `right`; anything else starts a new chain that inherits
    /// `left`'s check policy. A same-kind chain on the right is flattened
    /// unless it carries a check policy of its own that differs, in which
    /// case it stays nested.
    pub(crate) fn join(left: Node, kind: ChainKind, right: Node) -> Chain {
        let mut chain = match left {
            Node::Chain(c) if c.kind == kind => c,
            other => Chain { kind, check: other.default_check(), members: vec![other] },
        };
        match right {
            Node::Chain(c) if c.kind == kind && (c.check.is_unspecified() || c.check == chain.check) => {
                chain.members.extend(c.members)
            }
            other => chain.members.push(other),
        }
        chain
    }

    pub fn kind(&self) -> ChainKind { self.kind }
    pub fn members(&self) -> &[Node] { &self.members }
    pub fn len(&self) -> usize { self.members.len() }
    pub fn is_empty(&self) -> bool { self.members.is_empty() }

    pub fn with_check<C: Into<Check>>(mut self, check: C) -> Self { self.check = Deferred::Explicit(check.into()); self }

    fn split(&self) -> Result<(&Node, &[Node])> {
        self.members
            .split_last()
            .ok_or_else(|| PipeError::InvalidCommandSpec("empty chain".into()))
    }

    fn run_pipe(&self, mut opts: RunOptions) -> Result<Process> {
        let (last, init) = self.split()?;
        let wait = opts.wait;
        let mut stdin = opts.stdin.take();
        let mut stages: Vec<Process> = Vec::with_capacity(init.len());

        for member in init {
            let stage_opts = RunOptions {
                stdin,
                inherited_check: opts.inherited_check,
                spawn: opts.spawn.clone(),
                ..RunOptions::default()
            };
            let mut stage = match member.run(stage_opts.stdout(Stdio::Pipe).wait(false)) {
                Ok(p) => p,
                Err(e) => {
                    abort(&mut stages);
                    return Err(e);
                }
            };
            stdin = Deferred::Explicit(stage.take_stdin_for_next());
            stages.push(stage);
        }

        opts.stdin = stdin;
        match last.run(opts) {
            Ok(mut p) => {
                if wait {
                    process::reap(&mut stages);
                }
                p.adopt_upstream(stages);
                Ok(p)
            }
            Err(e @ PipeError::CommandFailed { .. }) => {
                process::reap(&mut stages);
                Err(e)
            }
            Err(e) => {
                abort(&mut stages);
                Err(e)
            }
        }
    }

    /// Shared `&&` / `||` walk: keep going while `proceed(exit_code)` holds,
    /// otherwise return the member that broke the run.
    fn run_sequence(&self, mut opts: RunOptions, proceed: fn(i32) -> bool) -> Result<Process> {
        let (last, init) = self.split()?;
        let mut stdin = opts.stdin.take();

        for member in init {
            let mut member_opts = opts.member();
            member_opts.stdin = stdin.take();
            let process = member.run(member_opts)?;
            let code = process.returncode().unwrap_or(-1);
            if !proceed(code) {
                tracing::trace!(member = %member, code, kind = self.kind.operator(), "chain stopped early");
                return Ok(process);
            }
        }

        opts.stdin = stdin;
        last.run(opts)
    }
}

fn abort(stages: &mut [Process]) {
    for stage in stages.iter_mut() {
        stage.kill_all();
    }
    process::reap(stages);
}

impl Runnable for Chain {
    fn run(&self, mut opts: RunOptions) -> Result<Process> {
        opts.inherited_check = self.check.or(opts.inherited_check);
        match self.kind {
            ChainKind::Pipe => self.run_pipe(opts),
            ChainKind::AndThen => self.run_sequence(opts, |code| code == 0),
            ChainKind::OrElse => self.run_sequence(opts, |code| code != 0),
        }
    }

    fn redirect(&self, redirect: Redirect) -> Self {
        let mut next = self.clone();
        let touches_output = redirect.touches_output();
        let Redirect { input, output, append } = redirect;
        if input.is_explicit() {
            if let Some(first) = next.members.first_mut() {
                *first = first.redirect(Redirect { input, ..Redirect::default() });
            }
        }
        if touches_output {
            if let Some(last) = next.members.last_mut() {
                *last = last.redirect(Redirect { output, append, ..Redirect::default() });
            }
        }
        next
    }

    fn default_check(&self) -> Deferred<Check> { self.check }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&render::render_chain(self)) }
}
