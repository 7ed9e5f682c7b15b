//! Command modeling: single invocations, chains of them, and the fluent
//! surface they share.

pub mod chain;
pub mod stdio;

pub use chain::{Chain, ChainKind};
pub use stdio::{Input, Redirect, Stdio};

use std::ffi::{OsStr, OsString};
use std::fmt;

use crate::deferred::{first_specified, Deferred};
use crate::error::{PipeError, Result};
use crate::exec::{self, Check, Lines, Process, RunOptions};
use crate::render;
use crate::runner::Runner;

/// Behaviour shared by every node in a command tree.
///
/// Nodes are immutable: every builder method returns a new value.
pub trait Runnable: Clone + Into<Node> {
    /// Spawn the node. When `opts` asks to wait, blocks until exit and
    /// applies the resolved check policy.
    fn run(&self, opts: RunOptions) -> Result<Process>;

    /// Copy of the node with the given redirections applied.
    fn redirect(&self, redirect: Redirect) -> Self;

    /// Check policy used when neither the caller nor a member decides.
    fn default_check(&self) -> Deferred<Check>;

    fn call(&self) -> Result<Process> { self.run(RunOptions::new()) }

    /// Start without waiting or checking.
    fn bg(&self) -> Result<Process> { self.run(RunOptions::new().wait(false).check(Check::Never)) }

    fn stdin_from<T: Into<Stdio>>(&self, input: T) -> Self { self.redirect(Redirect::new().input(input)) }

    /// Send output to `target`, truncating it if it is a path.
    fn stdout_to<T: Into<Stdio>>(&self, target: T) -> Self {
        self.redirect(Redirect::new().output(target).append(false))
    }

    /// Send output to `target`, appending if it is a path.
    fn append_to<T: Into<Stdio>>(&self, target: T) -> Self {
        self.redirect(Redirect::new().output(target).append(true))
    }

    fn discard(&self) -> Self { self.stdout_to(Stdio::Null) }

    fn pipe_to<N: Into<Node>>(&self, next: N) -> Chain { Chain::join(self.clone().into(), ChainKind::Pipe, next.into()) }
    fn and_then<N: Into<Node>>(&self, next: N) -> Chain { Chain::join(self.clone().into(), ChainKind::AndThen, next.into()) }
    fn or_else<N: Into<Node>>(&self, next: N) -> Chain { Chain::join(self.clone().into(), ChainKind::OrElse, next.into()) }

    fn run_with<T>(&self, runner: &Runner<T>) -> Result<T> { runner.apply(self) }

    /// Run to completion and return everything written to stdout.
    /// Runs the command again on every call.
    fn output_bytes(&self) -> Result<Vec<u8>> {
        let mut process = self.run(RunOptions::new().stdout(Stdio::Pipe))?;
        Ok(process.read_stdout()?)
    }

    fn output_string(&self) -> Result<String> { Ok(String::from_utf8(self.output_bytes()?)?) }

    /// Stream output line by line while the command runs.
    fn lines(&self) -> Result<Lines> {
        let process = self.run(RunOptions::new().stdout(Stdio::Pipe).wait(false))?;
        Ok(Lines::new(process))
    }
}

/// A single external program invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    program: OsString,
    args: Vec<OsString>,
    input: Deferred<Stdio>,
    output: Deferred<Stdio>,
    append: Deferred<bool>,
    check: Deferred<Check>,
}

impl Command {
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            args: Vec::new(),
            input: Deferred::Unspecified,
            output: Deferred::Unspecified,
            append: Deferred::Unspecified,
            check: Deferred::Unspecified,
        }
    }

    /// Split `line` with POSIX shell quoting rules into program and args.
    pub fn parse(line: &str) -> Result<Self> {
        let words = shlex::split(line)
            .ok_or_else(|| PipeError::InvalidCommandSpec(format!("unbalanced quoting in {line:?}")))?;
        Self::from_argv(words)
    }

    pub fn from_argv<I, S>(argv: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut it = argv.into_iter();
        let program = it.next().ok_or_else(|| PipeError::InvalidCommandSpec("empty command".into()))?;
        Ok(Self::new(program).args(it))
    }

    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self { self.args.push(arg.as_ref().to_owned()); self }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(args.into_iter().map(|a| a.as_ref().to_owned()));
        self
    }

    pub fn with_check<C: Into<Check>>(mut self, check: C) -> Self { self.check = Deferred::Explicit(check.into()); self }

    /// Run with extra arguments appended for this call only.
    pub fn invoke<I, S>(&self, args: I, opts: RunOptions) -> Result<Process>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.clone().args(args).run(opts)
    }

    pub fn program(&self) -> &OsStr { &self.program }
    pub fn get_args(&self) -> &[OsString] { &self.args }
    pub fn input(&self) -> &Deferred<Stdio> { &self.input }
    pub fn output(&self) -> &Deferred<Stdio> { &self.output }
    pub fn append(&self) -> Deferred<bool> { self.append }
    pub fn check(&self) -> Deferred<Check> { self.check }
}

impl Runnable for Command {
    fn run(&self, opts: RunOptions) -> Result<Process> {
        let RunOptions { stdin, stdout, append, wait, check, inherited_check, spawn } = opts;

        let stdin = stdin
            .or_else(|| self.input.clone().map(Input::Target))
            .resolve(Input::Target(Stdio::Inherit));
        let append = append.or(self.append).resolve(false);
        let stdout = stdout.or_else(|| self.output.clone()).resolve(Stdio::Inherit);
        let check = first_specified([check, self.check, inherited_check]).resolve(Check::Never);

        // the parent end of these pipes would be unreachable from Process
        if matches!(stdin, Input::Target(Stdio::Pipe)) {
            return Err(PipeError::InvalidCommandSpec(format!(
                "`{}`: stdin cannot be a pipe, pipe another command into it",
                self
            )));
        }
        if matches!(spawn.stderr, Stdio::Pipe) {
            return Err(PipeError::InvalidCommandSpec(format!("`{}`: stderr cannot be a pipe", self)));
        }

        let child = exec::spawn(&self.program, &self.args, stdin, &stdout, append, &spawn)?;
        let mut process = Process::new(child, self.to_string(), check);
        if wait {
            process.wait_checked()?;
        }
        Ok(process)
    }

    fn redirect(&self, redirect: Redirect) -> Self {
        let Redirect { input, output, append } = redirect;
        Self {
            input: input.or(self.input.clone()),
            output: output.or(self.output.clone()),
            append: append.or(self.append),
            ..self.clone()
        }
    }

    fn default_check(&self) -> Deferred<Check> { self.check }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&render::render_command(self)) }
}

/// Any node of a command tree.
#[derive(Debug, Clone)]
pub enum Node {
    Command(Command),
    Chain(Chain),
}

impl Runnable for Node {
    fn run(&self, opts: RunOptions) -> Result<Process> {
        match self {
            Node::Command(c) => c.run(opts),
            Node::Chain(c) => c.run(opts),
        }
    }

    fn redirect(&self, redirect: Redirect) -> Self {
        match self {
            Node::Command(c) => Node::Command(c.redirect(redirect)),
            Node::Chain(c) => Node::Chain(c.redirect(redirect)),
        }
    }

    fn default_check(&self) -> Deferred<Check> {
        match self {
            Node::Command(c) => c.default_check(),
            Node::Chain(c) => c.default_check(),
        }
    }
}

impl From<Command> for Node {
    fn from(c: Command) -> Self { Node::Command(c) }
}

impl From<Chain> for Node {
    fn from(c: Chain) -> Self { Node::Chain(c) }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Command(c) => c.fmt(f),
            Node::Chain(c) => c.fmt(f),
        }
    }
}

crate::impl_operators!(Command);
crate::impl_operators!(Chain);
crate::impl_operators!(Node);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_matches_argv() {
        let parsed = Command::parse("echo 'hello world' x").unwrap();
        let argv = Command::from_argv(["echo", "hello world", "x"]).unwrap();
        assert_eq!(parsed, argv);
        assert_eq!(parsed.program(), "echo");
        assert_eq!(parsed.get_args(), &[OsString::from("hello world"), OsString::from("x")]);
    }

    #[test]
    fn empty_sources_are_rejected() {
        assert!(matches!(Command::parse("   "), Err(PipeError::InvalidCommandSpec(_))));
        assert!(matches!(Command::parse("echo 'open"), Err(PipeError::InvalidCommandSpec(_))));
        assert!(matches!(Command::from_argv(Vec::<String>::new()), Err(PipeError::InvalidCommandSpec(_))));
    }

    #[test]
    fn args_append_without_touching_original() {
        let ls = Command::new("ls");
        let long = ls.clone().arg("-l");
        let both = long.clone().args(["-a", "/tmp"]);
        assert!(ls.get_args().is_empty());
        assert_eq!(long.get_args().len(), 1);
        assert_eq!(both.get_args(), &[OsString::from("-l"), OsString::from("-a"), OsString::from("/tmp")]);
    }

    #[test]
    fn redirect_only_replaces_given_fields() {
        let base = Command::new("cat").stdin_from("in.txt").append_to("out.txt");
        let next = base.stdout_to("other.txt");

        assert!(matches!(base.output(), Deferred::Explicit(Stdio::Path(p)) if p.ends_with("out.txt")));
        assert!(matches!(next.output(), Deferred::Explicit(Stdio::Path(p)) if p.ends_with("other.txt")));
        assert!(matches!(next.input(), Deferred::Explicit(Stdio::Path(p)) if p.ends_with("in.txt")));
        assert_eq!(base.append(), Deferred::Explicit(true));
        assert_eq!(next.append(), Deferred::Explicit(false));

        let reread = next.stdin_from(Stdio::Null);
        assert_eq!(reread.append(), Deferred::Explicit(false));
        assert!(matches!(reread.output(), Deferred::Explicit(Stdio::Path(p)) if p.ends_with("other.txt")));
    }

    #[test]
    fn discard_and_null_target_are_the_same() {
        let cmd = Command::new("echo").arg("x");
        let a = cmd.discard();
        let b = cmd.stdout_to(None::<&str>);
        let c = Stdio::Null.receive(cmd.clone());
        assert_eq!(a.to_string(), b.to_string());
        assert_eq!(b.to_string(), c.to_string());
        assert!(matches!(a.output(), Deferred::Explicit(Stdio::Null)));
    }

    #[test]
    fn pipe_is_not_an_input_or_stderr_target() {
        let cat = Command::new("cat");
        assert!(matches!(cat.stdin_from(Stdio::Pipe).call(), Err(PipeError::InvalidCommandSpec(_))));
        assert!(matches!(cat.run(RunOptions::new().stdin(Stdio::Pipe)), Err(PipeError::InvalidCommandSpec(_))));
        assert!(matches!(cat.run(RunOptions::new().stderr(Stdio::Pipe)), Err(PipeError::InvalidCommandSpec(_))));
    }

    #[test]
    fn with_check_is_default_check() {
        let cmd = Command::new("false").with_check(true);
        assert_eq!(cmd.default_check(), Deferred::Explicit(Check::Success));
        assert!(Command::new("false").default_check().is_unspecified());
    }
}
