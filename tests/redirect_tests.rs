//! File redirection on commands and chains.

use std::fs;
use std::path::{Path, PathBuf};

use pipecmd::prelude::*;
use rstest::rstest;
use tempfile::TempDir;

fn echo(s: &str) -> Command {
    sh("echo").arg(s)
}

/// Nodes that all print exactly "test\n".
fn echo_test(shape: &str) -> Node {
    match shape {
        "leaf" => echo("test").into(),
        "pipe" => (echo("test") | sh("cat")).into(),
        "and" => (sh("true") & echo("test")).into(),
        "or" => (sh("false") ^ echo("test")).into(),
        other => panic!("unknown shape {other}"),
    }
}

fn scratch() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.txt");
    (dir, path)
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

// ============================================================================
// Output
// ============================================================================

#[rstest]
fn truncate_keeps_last_run(
    #[values("leaf", "pipe", "and", "or")] shape: &str,
    #[values(false, true)] file_first: bool,
) {
    let (_dir, path) = scratch();
    let node = echo_test(shape);
    let redirected = if file_first { Stdio::path(&path).receive(node) } else { node.stdout_to(&path) };

    redirected.call().unwrap();
    redirected.call().unwrap();
    assert_eq!(read(&path), "test\n");
}

#[rstest]
fn append_accumulates(
    #[values("leaf", "pipe", "and", "or")] shape: &str,
    #[values(false, true)] file_first: bool,
) {
    let (_dir, path) = scratch();
    let node = echo_test(shape);
    let redirected = if file_first { path.as_path() << node } else { node >> &path };

    redirected.call().unwrap();
    redirected.call().unwrap();
    assert_eq!(read(&path), "test\ntest\n");
}

#[test]
fn truncate_after_append_truncates() {
    let (_dir, path) = scratch();
    fs::write(&path, "old\n").unwrap();

    let node = (echo("test") >> &path).stdout_to(&path);
    node.call().unwrap();
    assert_eq!(read(&path), "test\n");
}

#[test]
fn append_option_on_run() {
    let (_dir, path) = scratch();
    fs::write(&path, "old\n").unwrap();

    echo("test").run(RunOptions::new().stdout(&path).append(true)).unwrap();
    assert_eq!(read(&path), "old\ntest\n");
}

#[test]
fn open_file_as_target() {
    let (_dir, path) = scratch();
    let file = fs::File::create(&path).unwrap();

    let node = (echo("a") & echo("b")).stdout_to(file);
    node.call().unwrap();
    assert_eq!(read(&path), "b\n");
}

#[test]
fn redirecting_whole_pipe_equals_redirecting_last_stage() {
    let dir = tempfile::tempdir().unwrap();
    let outer = dir.path().join("outer.txt");
    let inner = dir.path().join("inner.txt");

    (echo("test") | sh("rev")).stdout_to(&outer).call().unwrap();
    (echo("test") | sh("rev").stdout_to(&inner)).call().unwrap();

    assert_eq!(read(&outer), "tset\n");
    assert_eq!(read(&outer), read(&inner));
}

#[rstest]
fn null_sink_forms_agree(#[values("leaf", "pipe", "and", "or")] shape: &str) {
    let node = echo_test(shape);
    let forms = [
        node.discard(),
        node.stdout_to(Stdio::Null),
        node.stdout_to(None::<&str>),
        Stdio::Null.receive(node.clone()),
    ];
    for form in &forms {
        assert_eq!(form.to_string(), forms[0].to_string());
        let mut process = form.call().unwrap();
        assert_eq!(process.returncode(), Some(0));
        assert!(process.stdout().is_none());
    }
}

#[test]
fn explicit_stdout_overrides_own_redirect() {
    let (_dir, path) = scratch();
    let node = echo("test").stdout_to(&path);

    assert_eq!(node.output_string().unwrap(), "test\n");
    assert!(!path.exists());
}

#[test]
fn unexecuted_member_never_opens_its_target() {
    let (_dir, path) = scratch();
    let node = (sh("false") & echo("test")).stdout_to(&path);

    let process = node.call().unwrap();
    assert_eq!(process.returncode(), Some(1));
    assert!(!path.exists());
}

#[test]
fn sequence_members_keep_their_own_redirects() {
    let dir = tempfile::tempdir().unwrap();
    let files: Vec<PathBuf> = ["1", "2", "3"].iter().map(|n| dir.path().join(n)).collect();

    let and = sh("true")
        & echo("a").stdout_to(&files[0])
        & echo("b").stdout_to(&files[1])
        & sh("false")
        & echo("c").stdout_to(&files[2]);
    assert_eq!(and.call().unwrap().returncode(), Some(1));
    assert_eq!(read(&files[0]), "a\n");
    assert_eq!(read(&files[1]), "b\n");
    assert!(!files[2].exists());

    for f in &files[..2] {
        fs::remove_file(f).unwrap();
    }

    let or = sh("false") ^ echo("a").stdout_to(&files[0]) ^ echo("b").stdout_to(&files[1]);
    assert_eq!(or.call().unwrap().returncode(), Some(0));
    assert_eq!(read(&files[0]), "a\n");
    assert!(!files[1].exists());
}

// ============================================================================
// Input
// ============================================================================

fn input_file(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("in.txt");
    fs::write(&path, "1234").unwrap();
    path
}

#[rstest]
#[case(sh("cat").into())]
#[case((sh("cat") | sh("cat")).into())]
fn input_forms_agree(#[case] node: Node) {
    let dir = tempfile::tempdir().unwrap();
    let path = input_file(&dir);

    let forms = [
        node.stdin_from(&path),
        node.clone() << path.clone(),
        path.clone() >> node.clone(),
        path.as_path() >> node.clone(),
        Stdio::path(&path).feed(node.clone()),
    ];
    for form in &forms {
        assert_eq!(form.output_string().unwrap(), "1234");
    }
}

#[test]
fn str_target_forms() {
    let dir = tempfile::tempdir().unwrap();
    let path = input_file(&dir);
    let path_str = path.to_str().unwrap();

    assert_eq!((path_str >> sh("cat")).output_string().unwrap(), "1234");
    assert_eq!((sh("cat") << path_str).output_string().unwrap(), "1234");
}

#[test]
fn input_through_pipe_stages() {
    let dir = tempfile::tempdir().unwrap();
    let path = input_file(&dir);

    let chain = sh("cat") | sh("tr").args(["0-9", "a-j"]);
    let mut process = chain
        .run(RunOptions::new().stdin(Stdio::path(&path)).stdout(Stdio::Pipe))
        .unwrap();
    assert_eq!(process.read_stdout().unwrap(), b"bcde");
}

#[test]
fn open_file_as_input() {
    let dir = tempfile::tempdir().unwrap();
    let path = input_file(&dir);

    let node = sh("cat").stdin_from(fs::File::open(&path).unwrap());
    assert_eq!(node.output_string().unwrap(), "1234");
}

#[test]
fn null_input_reads_nothing() {
    assert_eq!(sh("cat").stdin_from(Stdio::Null).output_string().unwrap(), "");
    assert_eq!((sh("cat") << None::<&str>).output_string().unwrap(), "");
}

#[rstest]
#[case(sh("cat").into())]
#[case((sh("cat") | sh("cat")).into())]
fn pipe_as_input_is_rejected_before_spawn(#[case] node: Node) {
    assert!(matches!(node.stdin_from(Stdio::Pipe).call(), Err(PipeError::InvalidCommandSpec(_))));
    assert!(matches!(
        node.run(RunOptions::new().stdin(Stdio::Pipe).wait(false)),
        Err(PipeError::InvalidCommandSpec(_))
    ));
    assert!(matches!(node.run(RunOptions::new().stderr(Stdio::Pipe)), Err(PipeError::InvalidCommandSpec(_))));
}

#[test]
fn missing_input_file_fails_at_run() {
    let dir = tempfile::tempdir().unwrap();
    let node = sh("cat") << dir.path().join("missing");

    match node.call() {
        Err(PipeError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
        other => panic!("expected io error, got {other:?}"),
    }
}

#[test]
fn input_and_output_together() {
    let dir = tempfile::tempdir().unwrap();
    let input = input_file(&dir);
    let output = dir.path().join("out.txt");

    (sh("cat") | sh("tr").args(["0-9", "a-j"])).stdin_from(&input).stdout_to(&output).call().unwrap();
    assert_eq!(read(&output), "bcde");
}
