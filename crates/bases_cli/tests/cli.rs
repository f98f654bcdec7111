use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn bases(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_bases"))
        .args(args)
        .env_remove("BASES_VAULT_ROOT")
        .env_remove("BASES_INCLUDE_SCRIPT")
        .env_remove("RUST_LOG")
        .output()
        .expect("run bases")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn vault() -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    let write = |rel: &str, body: &str| {
        let path = dir.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("mkdir");
        }
        fs::write(path, body).expect("write");
    };
    write("tasks/one.md", "---\nstatus: active\ntitle: One\n---\nbody\n");
    write("tasks/two.md", "---\nstatus: done\ntitle: Two\n---\nbody\n");
    write(
        "Tasks.base",
        "filters: 'status == \"active\"'\nviews:\n  - type: table\n    name: Open\n    order: [note.title]\n  - type: list\n    name: Everything\n",
    );
    dir
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("utf-8 path")
}

#[test]
fn render_prints_fragment() {
    let dir = vault();
    let output = bases(&["render", "Tasks", "--vault", path_str(dir.path())]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let html = stdout(&output);
    assert!(html.contains("<div class=\"base-container\" data-base=\"Tasks\">"));
    assert!(html.contains("<td>One</td>"));
    assert!(!html.contains("<td>Two</td>"));
    assert!(html.contains("base-tabs"));
    assert!(!html.contains("<script>"));
}

#[test]
fn render_single_view_to_file_with_script() {
    let dir = vault();
    let out = dir.path().join("out/tasks.html");
    let output = bases(&[
        "--vault",
        path_str(dir.path()),
        "--script",
        "render",
        "Tasks.base",
        "--view",
        "Open",
        "-o",
        path_str(&out),
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let html = fs::read_to_string(&out).expect("read output");
    assert!(!html.contains("base-tabs"));
    assert!(html.contains("<script>"));
}

#[test]
fn missing_base_renders_error_and_warns() {
    let dir = vault();
    let output = bases(&["render", "Nope", "--vault", path_str(dir.path())]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("<div class=\"base-error\">"));
    assert!(stderr(&output).contains("not found"));
}

#[test]
fn embed_replaces_references() {
    let dir = vault();
    let doc = dir.path().join("tasks/index.md");
    fs::write(
        &doc,
        "---\ntitle: Index\n---\n# Tasks\n\n![[Tasks.base#Everything]]\n\n![[diagram.png]]\n",
    )
    .expect("write doc");
    let output = bases(&[
        "embed",
        path_str(&doc),
        "--strip-frontmatter",
        "--vault",
        path_str(dir.path()),
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.starts_with("# Tasks\n"));
    assert!(out.contains("base-view-list"));
    assert!(out.contains("![[diagram.png]]"));
}

#[test]
fn embed_missing_document_fails() {
    let dir = vault();
    let output = bases(&["embed", "missing.md", "--vault", path_str(dir.path())]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("reading missing.md"));
}

#[test]
fn notes_lists_identifiers() {
    let dir = vault();
    let output = bases(&["notes", "--vault", path_str(dir.path())]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("tasks/one\ttasks/one.md"));
    assert!(out.contains("tasks/two\ttasks/two.md"));
}

#[test]
fn notes_on_missing_vault_fails() {
    let dir = vault();
    let missing = dir.path().join("nowhere");
    let output = bases(&["notes", "--vault", path_str(&missing)]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("loading notes"));
}

#[test]
fn script_prints_controller() {
    let output = bases(&["script"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("addEventListener(\"nav\""));
}
