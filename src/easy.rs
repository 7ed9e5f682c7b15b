//! Easy mode: command factories and loose construction.

use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

use crate::cmd::{Chain, Command, Node};
use crate::error::{PipeError, Result};
use crate::exec::Check;

/// Factory for commands that share a default check policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct Shell { pub check: Check }

impl Shell {
    pub const fn new(check: Check) -> Self { Self { check } }

    pub fn cmd<S: AsRef<OsStr>>(&self, program: S) -> Command {
        match self.check {
            Check::Never => Command::new(program),
            check => Command::new(program).with_check(check),
        }
    }
}

/// Commands with no check policy of their own.
pub const SH: Shell = Shell::new(Check::Never);
/// Commands that fail on a non-zero exit when waited on.
pub const CHECKED: Shell = Shell::new(Check::Success);

pub fn sh<S: AsRef<OsStr>>(program: S) -> Command { SH.cmd(program) }
pub fn checked<S: AsRef<OsStr>>(program: S) -> Command { CHECKED.cmd(program) }

/// The things a command can be built from.
#[derive(Debug, Clone)]
pub enum CommandDef {
    /// Split with shell quoting rules.
    Line(String),
    /// A program with no arguments.
    Program(PathBuf),
    Argv(Vec<OsString>),
    Node(Node),
}

impl From<&str> for CommandDef {
    fn from(s: &str) -> Self { CommandDef::Line(s.to_string()) }
}

impl From<String> for CommandDef {
    fn from(s: String) -> Self { CommandDef::Line(s) }
}

impl From<PathBuf> for CommandDef {
    fn from(p: PathBuf) -> Self { CommandDef::Program(p) }
}

impl From<&std::path::Path> for CommandDef {
    fn from(p: &std::path::Path) -> Self { CommandDef::Program(p.to_path_buf()) }
}

impl<S: AsRef<OsStr>> From<Vec<S>> for CommandDef {
    fn from(v: Vec<S>) -> Self { CommandDef::Argv(v.iter().map(|s| s.as_ref().to_owned()).collect()) }
}

impl<S: AsRef<OsStr>, const N: usize> From<[S; N]> for CommandDef {
    fn from(v: [S; N]) -> Self { CommandDef::Argv(v.iter().map(|s| s.as_ref().to_owned()).collect()) }
}

impl From<Command> for CommandDef {
    fn from(c: Command) -> Self { CommandDef::Node(Node::Command(c)) }
}

impl From<Chain> for CommandDef {
    fn from(c: Chain) -> Self { CommandDef::Node(Node::Chain(c)) }
}

impl From<Node> for CommandDef {
    fn from(n: Node) -> Self { CommandDef::Node(n) }
}

/// Build a node from any [`CommandDef`]. Nodes pass through untouched.
pub fn make<D: Into<CommandDef>>(def: D) -> Result<Node> {
    match def.into() {
        CommandDef::Line(line) => Ok(Command::parse(&line)?.into()),
        CommandDef::Program(p) => {
            if p.as_os_str().is_empty() {
                return Err(PipeError::InvalidCommandSpec("empty program path".into()));
            }
            Ok(Command::new(p).into())
        }
        CommandDef::Argv(argv) => Ok(Command::from_argv(argv)?.into()),
        CommandDef::Node(n) => Ok(n),
    }
}

impl TryFrom<&str> for Command {
    type Error = PipeError;
    fn try_from(s: &str) -> Result<Self> { Command::parse(s) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::Runnable;
    use crate::deferred::Deferred;

    fn leaf(n: Node) -> Command {
        match n {
            Node::Command(c) => c,
            Node::Chain(c) => panic!("expected a command, got {c}"),
        }
    }

    #[test]
    fn make_from_every_source() {
        let expected = Command::new("echo").arg("test");
        let sources: Vec<CommandDef> = vec![
            "echo test".into(),
            vec!["echo", "test"].into(),
            ["echo", "test"].into(),
            expected.clone().into(),
        ];
        for src in sources {
            assert_eq!(leaf(make(src).unwrap()), expected);
        }
        assert_eq!(leaf(make(PathBuf::from("/bin/ls")).unwrap()), Command::new("/bin/ls"));
    }

    #[test]
    fn make_rejects_empty() {
        assert!(matches!(make(""), Err(PipeError::InvalidCommandSpec(_))));
        assert!(matches!(make(Vec::<String>::new()), Err(PipeError::InvalidCommandSpec(_))));
        assert!(matches!(make(PathBuf::new()), Err(PipeError::InvalidCommandSpec(_))));
    }

    #[test]
    fn chains_pass_through() {
        let chain = sh("ls").pipe_to(sh("cat"));
        match make(chain).unwrap() {
            Node::Chain(c) => assert_eq!(c.len(), 2),
            other => panic!("expected chain, got {other}"),
        }
    }

    #[test]
    fn factories_set_check() {
        assert!(sh("ls").default_check().is_unspecified());
        assert_eq!(checked("ls").default_check(), Deferred::Explicit(Check::Success));
        assert_eq!(Shell::new(Check::Code(3)).cmd("x").default_check(), Deferred::Explicit(Check::Code(3)));
    }

    #[test]
    fn try_from_str() {
        let cmd = Command::try_from("grep -v 'a b'").unwrap();
        assert_eq!(cmd.to_string(), "grep -v 'a b'");
    }
}
