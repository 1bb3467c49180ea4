//! E2E tests for the `relabel` binary against a mock label service.

mod common;

use common::{dead_url, route, MockServer, Sandbox};
use predicates::str::contains;

/// One frame, two cells, one feature name.
const PROJECT: &str = r#"{
    "labeled": [[[[0, 1], [2, 2]]]],
    "lineage": {"1": {"daughters": [2]}, "2": {"parent": 1}},
    "labels": ["nuclear"]
}"#;

fn project_route() -> common::Route {
    route("GET /api/project/p1 ", 200, PROJECT)
}

// ─── Parsing ───────────────────────────────────────────────────────

#[test]
fn help_lists_subcommands() {
    Sandbox::new()
        .cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("load"))
        .stdout(contains("undo"))
        .stdout(contains("cache"));
}

#[test]
fn invalid_project_id_rejected() {
    Sandbox::new()
        .cmd()
        .args(["load", "not valid!"])
        .assert()
        .failure()
        .stderr(contains("invalid character"));
}

#[test]
fn edit_argument_needs_equals() {
    Sandbox::new()
        .cmd()
        .args(["edit", "p1", "swap", "label_1"])
        .assert()
        .failure()
        .stderr(contains("expected key=value"));
}

// ─── Project commands ──────────────────────────────────────────────

#[test]
fn load_prints_summary() {
    let server = MockServer::start(vec![project_route()]);
    Sandbox::new()
        .cmd()
        .args(["--api-url", &server.url, "load", "p1"])
        .assert()
        .success()
        .stdout(contains("p1: frames=1 cells=2 labels=nuclear cache=miss"));
}

#[test]
fn second_load_is_a_cache_hit() {
    let server = MockServer::start(vec![project_route()]);
    let sandbox = Sandbox::new();
    for expected in ["cache=miss", "cache=hit"] {
        sandbox
            .cmd()
            .args(["--api-url", &server.url, "load", "p1"])
            .assert()
            .success()
            .stdout(contains(expected));
    }
}

#[test]
fn loaded_project_shows_in_cache() {
    let server = MockServer::start(vec![project_route()]);
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["--api-url", &server.url, "load", "p1"])
        .assert()
        .success();

    sandbox
        .cmd()
        .args(["cache", "list"])
        .assert()
        .success()
        .stdout(contains("p1\tframes=1\tcells=2"));

    sandbox
        .cmd()
        .args(["cache", "delete", "p1"])
        .assert()
        .success()
        .stdout(contains("deleted p1"));

    sandbox
        .cmd()
        .args(["cache", "list"])
        .assert()
        .success()
        .stdout(contains("no cached projects"));
}

#[test]
fn edit_sends_form_and_reports_update() {
    let server = MockServer::start(vec![
        project_route(),
        route(
            "POST /api/edit/p1/swap ",
            200,
            r#"{"lineage": {"1": {}, "2": {}}}"#,
        ),
    ]);
    Sandbox::new()
        .cmd()
        .args([
            "--api-url",
            &server.url,
            "edit",
            "p1",
            "swap",
            "label_1=1",
            "label_2=2",
        ])
        .assert()
        .success()
        .stdout(contains("ok: updated lineage"));

    let edits: Vec<_> = server
        .requests()
        .into_iter()
        .filter(|(line, _)| line.starts_with("POST /api/edit/p1/swap"))
        .collect();
    assert_eq!(edits.len(), 1);
    assert!(edits[0].1.contains("label_1=1"));
    assert!(edits[0].1.contains("label_2=2"));
}

#[test]
fn rejected_edit_exits_nonzero() {
    let server = MockServer::start(vec![
        project_route(),
        route("POST /api/edit/p1/swap ", 500, r#"{"error":"bad arg"}"#),
    ]);
    Sandbox::new()
        .cmd()
        .args(["--api-url", &server.url, "edit", "p1", "swap"])
        .assert()
        .failure()
        .stderr(contains("error: bad arg"));
}

#[test]
fn undo_goes_to_service() {
    let server = MockServer::start(vec![project_route(), route("POST /api/undo/p1 ", 200, "")]);
    Sandbox::new()
        .cmd()
        .args(["--api-url", &server.url, "undo", "p1"])
        .assert()
        .success()
        .stdout(contains("ok: no changes"));
}

#[test]
fn display_and_rgb_paths() {
    let server = MockServer::start(vec![
        project_route(),
        route("POST /api/changedisplay/p1/frame/3 ", 200, "{}"),
        route("POST /api/rgb/p1/true ", 200, "{}"),
    ]);
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["--api-url", &server.url, "display", "p1", "frame", "3"])
        .assert()
        .success();
    sandbox
        .cmd()
        .args(["--api-url", &server.url, "rgb", "p1"])
        .assert()
        .success();
}

#[test]
fn missing_project_exits_nonzero() {
    let server = MockServer::start(vec![]);
    Sandbox::new()
        .cmd()
        .args(["--api-url", &server.url, "load", "p1"])
        .assert()
        .failure()
        .stderr(contains("error: no route"));
}

#[test]
fn unreachable_service_exits_nonzero() {
    Sandbox::new()
        .cmd()
        .args(["--api-url", &dead_url(), "load", "p1"])
        .assert()
        .failure()
        .stderr(contains("error:"));
}

// ─── Cache ─────────────────────────────────────────────────────────

#[test]
fn deleting_uncached_project_fails() {
    Sandbox::new()
        .cmd()
        .args(["cache", "delete", "ghost"])
        .assert()
        .failure()
        .stderr(contains("ghost is not cached"));
}

#[test]
fn log_file_flag_writes_log() {
    let server = MockServer::start(vec![project_route()]);
    let sandbox = Sandbox::new();
    let logs = sandbox.dir.path().join("logs");
    sandbox
        .cmd()
        .args(["--api-url", &server.url, "--log-file"])
        .arg(&logs)
        .args(["load", "p1"])
        .assert()
        .success();

    let log = std::fs::read_to_string(logs.join("relabel.log")).unwrap();
    assert!(log.contains("workspace started"));
}
