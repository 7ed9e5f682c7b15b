//! POSIX-shell rendering of command trees, used for `Display` and in
//! failure messages. Rendering never executes anything.

use crate::cmd::{Chain, Command, Node, Stdio};
use crate::deferred::Deferred;

pub fn render_command(cmd: &Command) -> String {
    let mut parts: Vec<String> = Vec::new();

    parts.push(quote_prog(&cmd.program().to_string_lossy()));
    for a in cmd.get_args() {
        parts.push(quote_arg(&a.to_string_lossy()));
    }

    if let Deferred::Explicit(t) = cmd.input() {
        if let Some(r) = render_redir(0, t, false) { parts.push(r); }
    }
    if let Deferred::Explicit(t) = cmd.output() {
        if let Some(r) = render_redir(1, t, cmd.append().resolve(false)) { parts.push(r); }
    }

    parts.join(" ")
}

/// Members joined by the chain operator. Nested chains are parenthesised.
pub fn render_chain(chain: &Chain) -> String {
    let sep = format!(" {} ", chain.kind().operator());
    chain
        .members()
        .iter()
        .map(|m| match m {
            Node::Command(c) => render_command(c),
            Node::Chain(c) => format!("({})", render_chain(c)),
        })
        .collect::<Vec<_>>()
        .join(&sep)
}

fn render_redir(fd: u8, io: &Stdio, append: bool) -> Option<String> {
    let op = match (fd, append) {
        (0, _) => "<",
        (_, true) => ">>",
        (_, false) => ">",
    };
    match io {
        Stdio::Inherit | Stdio::Pipe => None,
        Stdio::Null => Some(format!("{} /dev/null", op)),
        Stdio::Path(p) => Some(format!("{} {}", op, quote_arg(&p.to_string_lossy()))),
        Stdio::File(_) => Some(format!("{} <file>", op)),
    }
}

fn quote_prog(p: &str) -> String {
    if is_simple_word(p) { p.to_string() } else { quote_sh(p) }
}

fn quote_arg(a: &str) -> String {
    if !a.is_empty() && is_simple_word(a) { a.to_string() } else { quote_sh(a) }
}

fn is_simple_word(s: &str) -> bool {
    s.chars().all(|c| matches!(c,
        'a'..='z' | 'A'..='Z' | '0'..='9' | '_' | '-' | '.' | '/' | ':' | '+' | '%' | '@' | '=' | ','))
}

fn quote_sh(s: &str) -> String {
    if s.is_empty() { return "''".to_string(); }
    let escaped = s.replace('\'', "'\"'\"'");
    format!("'{}'", escaped)
}
