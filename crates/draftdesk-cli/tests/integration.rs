#![allow(deprecated)]
use assert_cmd::Command;
use mockito::{Matcher, Server, ServerGuard};
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;

fn draftdesk(dir: &TempDir, backend: &str) -> Command {
    let mut cmd = Command::cargo_bin("draftdesk").unwrap();
    cmd.env("DRAFTDESK_HOME", dir.path())
        .env("DRAFTDESK_BACKEND_URL", backend)
        .env_remove("DRAFTDESK_SESSION")
        .env_remove("RUST_LOG");
    cmd
}

fn offline(dir: &TempDir) -> Command {
    // Nothing listens here; commands that stay local must not care.
    draftdesk(dir, "http://127.0.0.1:9")
}

fn catalog_server() -> ServerGuard {
    let mut server = Server::new();
    server
        .mock("GET", "/prompts/")
        .with_header("content-type", "application/json")
        .with_body(
            json!([
                { "id": "P1", "title": "Explainer", "content": "Explain simply", "tags": [], "type": "generation" },
                { "id": "P2", "title": "Listicle", "content": "Write a list", "tags": ["fun"], "type": "generation" },
                { "id": "C1", "title": "Editor", "content": "Be strict", "tags": [], "type": "critique" }
            ])
            .to_string(),
        )
        .expect_at_least(0)
        .create();
    server
        .mock("GET", "/supplementals/")
        .with_header("content-type", "application/json")
        .with_body(
            json!([
                { "id": "S1", "title": "Brand voice", "content": "Warm and direct", "tags": [] }
            ])
            .to_string(),
        )
        .expect_at_least(0)
        .create();
    server
}

fn prompts_body() -> String {
    json!([
        { "id": "P1", "title": "Explainer", "content": "Explain simply", "tags": [], "type": "generation" }
    ])
    .to_string()
}

fn write_config(dir: &TempDir, yaml: &str) {
    std::fs::write(dir.path().join("config.yaml"), yaml).unwrap();
}

fn seed_session(dir: &TempDir, value: serde_json::Value) {
    std::fs::create_dir_all(dir.path().join("sessions")).unwrap();
    std::fs::write(dir.path().join("sessions/default.json"), value.to_string()).unwrap();
}

fn session_json(dir: &TempDir) -> serde_json::Value {
    let raw = std::fs::read_to_string(dir.path().join("sessions/default.json")).unwrap();
    serde_json::from_str(&raw).unwrap()
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

#[test]
fn config_validate_defaults_is_clean() {
    let dir = TempDir::new().unwrap();
    offline(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Config is valid"));
}

#[test]
fn config_validate_rejects_bad_url() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("config.yaml"),
        "backend:\n  base_url: localhost:8000\n",
    )
    .unwrap();
    // The config file is the only source of the URL here.
    let mut cmd = Command::cargo_bin("draftdesk").unwrap();
    cmd.env("DRAFTDESK_HOME", dir.path())
        .env_remove("DRAFTDESK_BACKEND_URL")
        .args(["config", "validate"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("[error]"))
        .stderr(predicate::str::contains("config validation found errors"));
}

// ---------------------------------------------------------------------------
// select / selection
// ---------------------------------------------------------------------------

#[test]
fn select_confirm_persists_selection() {
    let dir = TempDir::new().unwrap();
    let server = catalog_server();

    draftdesk(&dir, &server.url())
        .args([
            "select",
            "prompts:generation",
            "--return-to",
            "/generate",
            "--toggle",
            "P1",
            "--toggle",
            "P2",
            "--confirm",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Returning to /generate"));

    assert_eq!(
        session_json(&dir)["selectedPrompts_generation"],
        json!("[\"P1\",\"P2\"]")
    );

    draftdesk(&dir, &server.url())
        .args(["selection", "show", "prompts:generation"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Explainer"))
        .stdout(predicate::str::contains("Listicle"));
}

#[test]
fn select_cancel_leaves_selection_untouched() {
    let dir = TempDir::new().unwrap();
    let server = catalog_server();

    draftdesk(&dir, &server.url())
        .args(["select", "prompts:generation", "--toggle", "P1", "--confirm"])
        .assert()
        .success();
    draftdesk(&dir, &server.url())
        .args([
            "select",
            "prompts:generation",
            "--toggle",
            "P1",
            "--toggle",
            "P2",
            "--cancel",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Selection unchanged"));

    assert_eq!(
        session_json(&dir)["selectedPrompts_generation"],
        json!("[\"P1\"]")
    );
}

#[test]
fn select_json_reports_pending_and_items() {
    let dir = TempDir::new().unwrap();
    let server = catalog_server();

    let out = draftdesk(&dir, &server.url())
        .args(["--json", "select", "supplementals", "--toggle", "S1", "--confirm"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(value["outcome"], "confirmed");
    assert_eq!(value["return_to"], "/");
    assert_eq!(value["selected"], json!(["S1"]));
    assert_eq!(value["items"][0]["selected"], true);
}

#[test]
fn select_requires_confirm_or_cancel() {
    let dir = TempDir::new().unwrap();
    offline(&dir)
        .args(["select", "supplementals"])
        .assert()
        .failure();
}

#[test]
fn select_rejects_unknown_context() {
    let dir = TempDir::new().unwrap();
    offline(&dir)
        .args(["select", "prompts:poetry", "--confirm"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid selection context"));
}

#[test]
fn select_warns_about_ids_missing_from_catalog() {
    let dir = TempDir::new().unwrap();
    let server = catalog_server();

    draftdesk(&dir, &server.url())
        .args(["select", "prompts:generation", "--toggle", "P1", "--toggle", "P9", "--confirm"])
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "warning: 'P9' is not in the generation prompt catalog",
        ))
        .stderr(predicate::str::contains("'P1'").not());
}

#[test]
fn inline_create_then_cancel_keeps_item_unselected() {
    let dir = TempDir::new().unwrap();
    let mut server = catalog_server();
    let create = server
        .mock("POST", "/supplementals/")
        .match_body(Matcher::PartialJson(json!({ "title": "S2", "content": "New facts" })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(json!({ "id": "S2", "title": "S2", "content": "New facts", "tags": [] }).to_string())
        .create();

    draftdesk(&dir, &server.url())
        .args(["select", "supplementals", "--toggle", "S1", "--confirm"])
        .assert()
        .success();
    draftdesk(&dir, &server.url())
        .args([
            "select",
            "supplementals",
            "--create-title",
            "S2",
            "--create-content",
            "New facts",
            "--cancel",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created S2"));

    create.assert();
    assert_eq!(session_json(&dir)["selectedSupplements"], json!("[\"S1\"]"));
}

#[test]
fn selection_remove_rewrites_store() {
    let dir = TempDir::new().unwrap();
    let server = catalog_server();

    draftdesk(&dir, &server.url())
        .args(["select", "prompts:generation", "--toggle", "P1", "--toggle", "P2", "--confirm"])
        .assert()
        .success();
    draftdesk(&dir, &server.url())
        .args(["selection", "remove", "prompts:generation", "P1"])
        .assert()
        .success();

    assert_eq!(
        session_json(&dir)["selectedPrompts_generation"],
        json!("[\"P2\"]")
    );
}

// ---------------------------------------------------------------------------
// generate
// ---------------------------------------------------------------------------

#[test]
fn generate_without_prompt_makes_no_request() {
    let dir = TempDir::new().unwrap();
    let mut server = catalog_server();
    let generate = server.mock("POST", "/generate").expect(0).create();

    draftdesk(&dir, &server.url())
        .args(["generate", "--topic", "Rust"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Select or add a prompt first."));

    generate.assert();
}

#[test]
fn generate_sends_first_prompt_and_supplementals() {
    let dir = TempDir::new().unwrap();
    let mut server = catalog_server();
    let generate = server
        .mock("POST", "/generate")
        .match_body(Matcher::Json(json!({
            "topic": "Ownership",
            "prompt_id": "P2",
            "supplemental": "Warm and direct"
        })))
        .with_header("content-type", "application/json")
        .with_body(json!({ "article": "# Ownership\n\nBody." }).to_string())
        .create();

    draftdesk(&dir, &server.url())
        .args(["select", "prompts:generation", "--toggle", "P2", "--toggle", "P1", "--confirm"])
        .assert()
        .success();
    draftdesk(&dir, &server.url())
        .args(["select", "supplementals", "--toggle", "S1", "--confirm"])
        .assert()
        .success();

    draftdesk(&dir, &server.url())
        .args(["generate", "--topic", "Ownership"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# Ownership"));

    generate.assert();
}

#[test]
fn generate_drops_deleted_prompt_before_submitting() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("sessions")).unwrap();
    std::fs::write(
        dir.path().join("sessions/default.json"),
        json!({ "selectedPrompts_generation": "[\"GONE\"]" }).to_string(),
    )
    .unwrap();
    let mut server = catalog_server();
    let generate = server.mock("POST", "/generate").expect(0).create();

    draftdesk(&dir, &server.url())
        .args(["generate", "--topic", "Rust"])
        .assert()
        .failure();

    generate.assert();
    assert_eq!(session_json(&dir)["selectedPrompts_generation"], json!("[]"));
}

#[test]
fn generate_reports_catalog_failure_instead_of_missing_prompt() {
    let dir = TempDir::new().unwrap();
    seed_session(&dir, json!({ "selectedPrompts_generation": "[\"P1\"]" }));
    let mut server = Server::new();
    server.mock("GET", "/prompts/").with_status(500).create();
    server
        .mock("GET", "/supplementals/")
        .with_header("content-type", "application/json")
        .with_body("[]")
        .create();
    let generate = server.mock("POST", "/generate").expect(0).create();

    draftdesk(&dir, &server.url())
        .args(["generate", "--topic", "Rust"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("warning: could not load prompts:generation"))
        .stderr(predicate::str::contains("Could not load generation prompts"))
        .stderr(predicate::str::contains("Select or add a prompt first.").not());

    generate.assert();
    // The stored selection survives for the next attempt.
    assert_eq!(
        session_json(&dir)["selectedPrompts_generation"],
        json!("[\"P1\"]")
    );
}

// ---------------------------------------------------------------------------
// project dashboard
// ---------------------------------------------------------------------------

fn project_server() -> ServerGuard {
    let mut server = catalog_server();
    server
        .mock("GET", "/projects/launch")
        .with_header("content-type", "application/json")
        .with_body(json!({ "id": "launch", "title": "Launch week" }).to_string())
        .create();
    server
}

#[test]
fn project_generate_mounts_under_project_route() {
    let dir = TempDir::new().unwrap();
    seed_session(&dir, json!({ "selectedPrompts_generation": "[\"P1\"]" }));
    let mut server = project_server();
    let generate = server
        .mock("POST", "/generate")
        .match_body(Matcher::PartialJson(json!({ "topic": "Launch", "prompt_id": "P1" })))
        .with_header("content-type", "application/json")
        .with_body(json!({ "article": "# Launch" }).to_string())
        .create();

    let out = draftdesk(&dir, &server.url())
        .args(["--json", "project", "generate", "launch", "--topic", "Launch"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(value["route"], "/projects/launch/generate");
    assert_eq!(value["article"], "# Launch");

    generate.assert();
    assert_eq!(session_json(&dir)["projectTab"], "generate");
}

#[test]
fn project_critique_switches_tab() {
    let dir = TempDir::new().unwrap();
    seed_session(&dir, json!({ "selectedPrompts_critique": "[\"C1\"]" }));
    let mut server = project_server();
    server
        .mock("POST", "/critique")
        .with_header("content-type", "application/json")
        .with_body(json!({ "critique": "Tighten the intro." }).to_string())
        .create();

    draftdesk(&dir, &server.url())
        .args(["--json", "project", "critique", "launch", "--markdown", "# Draft"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/projects/launch/critique"));

    assert_eq!(session_json(&dir)["projectTab"], "critique");
}

#[test]
fn project_form_for_unknown_project_fails() {
    let dir = TempDir::new().unwrap();
    let mut server = catalog_server();
    server.mock("GET", "/projects/nope").with_status(404).create();
    let generate = server.mock("POST", "/generate").expect(0).create();

    draftdesk(&dir, &server.url())
        .args(["project", "generate", "nope", "--topic", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load project 'nope'"));

    generate.assert();
}

// ---------------------------------------------------------------------------
// catalog cache
// ---------------------------------------------------------------------------

#[test]
fn catalog_cache_is_reused_across_runs() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, "catalog:\n  cache_ttl_secs: 600\n");
    let mut server = Server::new();
    let prompts = server
        .mock("GET", "/prompts/")
        .with_header("content-type", "application/json")
        .with_body(prompts_body())
        .expect(1)
        .create();

    for _ in 0..2 {
        draftdesk(&dir, &server.url())
            .args(["select", "prompts:generation", "--toggle", "P1", "--cancel"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Explainer"));
    }

    prompts.assert();
    assert!(dir.path().join("cache/prompts-generation.json").exists());
}

#[test]
fn catalog_cache_is_dropped_after_prompt_edits() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, "catalog:\n  cache_ttl_secs: 600\n");
    let mut server = Server::new();
    let prompts = server
        .mock("GET", "/prompts/")
        .with_header("content-type", "application/json")
        .with_body(prompts_body())
        .expect(2)
        .create();
    server
        .mock("POST", "/prompts/")
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(
            json!({ "id": "P5", "title": "New", "content": "Body", "tags": [], "type": "generation" })
                .to_string(),
        )
        .create();

    let select = |dir: &TempDir| {
        draftdesk(dir, &server.url())
            .args(["select", "prompts:generation", "--cancel"])
            .assert()
            .success();
    };
    select(&dir);
    draftdesk(&dir, &server.url())
        .args(["prompts", "create", "--type", "generation", "--title", "New", "--content", "Body"])
        .assert()
        .success();
    assert!(!dir.path().join("cache/prompts-generation.json").exists());
    select(&dir);
    select(&dir);

    prompts.assert();
}

#[test]
fn zero_ttl_fetches_every_run() {
    let dir = TempDir::new().unwrap();
    let mut server = Server::new();
    let prompts = server
        .mock("GET", "/prompts/")
        .with_header("content-type", "application/json")
        .with_body(prompts_body())
        .expect(2)
        .create();

    for _ in 0..2 {
        draftdesk(&dir, &server.url())
            .args(["select", "prompts:generation", "--cancel"])
            .assert()
            .success();
    }

    prompts.assert();
    assert!(!dir.path().join("cache").exists());
}

// ---------------------------------------------------------------------------
// session
// ---------------------------------------------------------------------------

#[test]
fn session_clear_discards_selections() {
    let dir = TempDir::new().unwrap();
    let server = catalog_server();

    draftdesk(&dir, &server.url())
        .args(["select", "supplementals", "--toggle", "S1", "--confirm"])
        .assert()
        .success();
    assert!(dir.path().join("sessions/default.json").exists());

    offline(&dir)
        .args(["session", "clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Session cleared."));
    assert!(!dir.path().join("sessions/default.json").exists());

    offline(&dir)
        .args(["session", "clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already empty"));
}

#[test]
fn sessions_are_isolated() {
    let dir = TempDir::new().unwrap();
    let server = catalog_server();

    draftdesk(&dir, &server.url())
        .args(["--session", "alice", "select", "supplementals", "--toggle", "S1", "--confirm"])
        .assert()
        .success();

    offline(&dir)
        .args(["--json", "selection", "show", "supplementals"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"supplementals\": []"));
}
