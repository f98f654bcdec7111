use std::fs;
use std::path::Path;

use bases_render::{RenderConfig, RenderSession, TAB_CONTROLLER_SCRIPT};
use tempfile::TempDir;

fn vault(notes: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    for (path, body) in notes {
        let full = dir.path().join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).expect("mkdir");
        }
        fs::write(full, body).expect("write note");
    }
    dir
}

fn session(root: &Path) -> RenderSession {
    RenderSession::new(RenderConfig {
        vault_root: root.to_path_buf(),
        ..RenderConfig::default()
    })
}

fn tbody(html: &str) -> &str {
    let start = html.find("<tbody>").expect("tbody");
    let end = html.find("</tbody>").expect("/tbody");
    &html[start..end]
}

#[test]
fn table_has_one_row_per_record_and_one_column() {
    for n in [0usize, 1, 4] {
        let notes: Vec<(String, String)> = (0..n)
            .map(|i| (format!("note-{i}.md"), format!("---\nrank: {i}\n---\n")))
            .collect();
        let refs: Vec<(&str, &str)> = notes
            .iter()
            .map(|(p, b)| (p.as_str(), b.as_str()))
            .collect();
        let dir = vault(&refs);
        fs::write(
            dir.path().join("All.base"),
            "views:\n  - type: table\n    order: [file.name]\n",
        )
        .expect("write base");

        let html = session(dir.path()).render_base("All", None, None);
        assert!(!html.contains("base-error"), "{html}");
        assert_eq!(html.matches("<th>").count(), 1);
        assert_eq!(tbody(&html).matches("<tr>").count(), n);
    }
}

#[test]
fn list_filtered_by_status() {
    let dir = vault(&[
        ("a.md", "---\nstatus: active\ntitle: A\n---\n"),
        ("b.md", "---\nstatus: closed\ntitle: B\n---\n"),
    ]);
    fs::write(
        dir.path().join("Active.base"),
        "filters:\n  and:\n    - 'status == \"active\"'\nviews:\n  - type: list\n    order: [note.title]\n",
    )
    .expect("write base");

    let html = session(dir.path()).render_base("Active.base", None, None);
    assert_eq!(html.matches("<li>").count(), 1, "{html}");
    assert!(html.contains(": A</li>"));
    assert!(!html.contains(": B</li>"));
}

#[test]
fn formula_columns_render_links_to_the_record() {
    let dir = vault(&[("people/alice.md", "---\ntitle: Alice\n---\n")]);
    fs::write(
        dir.path().join("People.base"),
        "formulas:\n  who: 'link(file.name, note.title)'\nviews:\n  - type: table\n    order: [formula.who]\n",
    )
    .expect("write base");

    let html = session(dir.path()).render_base("People", None, None);
    assert!(
        html.contains("<td><a href=\"people/alice\" class=\"internal\">Alice</a></td>"),
        "{html}"
    );
}

#[test]
fn malformed_definition_embedded_twice_renders_two_errors() {
    let dir = vault(&[("doc.md", "")]);
    fs::write(dir.path().join("Broken.base"), "views: [unclosed").expect("write base");
    let markdown = "# Doc\n\n![[Broken.base]]\n\ntext\n\n![[Broken.base#Main]]\n";

    let out = session(dir.path()).render_document(markdown, &dir.path().join("doc.md"));
    assert_eq!(out.matches("<div class=\"base-error\">").count(), 2, "{out}");
    assert!(out.starts_with("# Doc\n"));
    assert!(out.contains("\ntext\n"));
}

#[test]
fn one_failing_embed_does_not_affect_another() {
    let dir = vault(&[("a.md", "---\ntitle: A\n---\n")]);
    fs::write(dir.path().join("Good.base"), "views:\n  - type: table\n").expect("write base");
    let markdown = "![[Missing.base]]\n![[Good.base]]\n```base\nviews:\n  - type: cards\n```\n![[photo.png]]\n";

    let out = session(dir.path()).render_document(markdown, Path::new("doc.md"));
    assert_eq!(out.matches("base-error").count(), 1, "{out}");
    assert!(out.contains("Missing"));
    assert_eq!(out.matches("<div class=\"base-container\"").count(), 2);
    assert!(out.contains("data-base=\"Good.base\""));
    assert!(out.contains("data-base=\"inline\""));
    assert!(out.contains("![[photo.png]]"));
}

#[test]
fn missing_view_in_embed_names_it() {
    let dir = vault(&[]);
    fs::write(dir.path().join("Books.base"), "views:\n  - type: table\n    name: All\n")
        .expect("write base");
    let out = session(dir.path()).render_document("![[Books.base#Unread]]", Path::new("x.md"));
    assert_eq!(out, "<div class=\"base-error\">View not found: Unread</div>");
}

#[test]
fn failed_definition_loads_are_retried() {
    let dir = vault(&[]);
    let mut session = session(dir.path());
    let first = session.render_base("Later", None, None);
    assert!(first.contains("base-error"));

    fs::write(dir.path().join("Later.base"), "views:\n  - type: list\n").expect("write base");
    let second = session.render_base("Later", None, None);
    assert!(!second.contains("base-error"), "{second}");
    assert!(second.contains("base-view-list"));
}

#[test]
fn definitions_next_to_the_document_are_found() {
    let dir = vault(&[("projects/plan.md", "")]);
    fs::write(dir.path().join("projects/Tasks.base"), "views:\n  - type: table\n")
        .expect("write base");
    let out = session(dir.path()).render_document(
        "![[Tasks.base]]",
        &dir.path().join("projects/plan.md"),
    );
    assert!(!out.contains("base-error"), "{out}");
}

#[test]
fn script_is_appended_once_when_enabled() {
    let dir = vault(&[]);
    fs::write(dir.path().join("T.base"), "views:\n  - type: table\n  - type: list\n")
        .expect("write base");
    let mut session = RenderSession::new(RenderConfig {
        vault_root: dir.path().to_path_buf(),
        include_script: true,
        ..RenderConfig::default()
    });
    let out = session.render_document("![[T.base]]\n![[T.base]]\n", Path::new("d.md"));
    assert_eq!(out.matches("<script>").count(), 1);
    assert!(out.contains(TAB_CONTROLLER_SCRIPT));

    let plain = session.render_document("no embeds here\n", Path::new("d.md"));
    assert_eq!(plain, "no embeds here\n");
}
