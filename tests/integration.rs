use predicates::prelude::*;
use std::io::Write;
use std::process::Command;
use tempfile::{NamedTempFile, TempDir};

fn cmd() -> assert_cmd::Command {
    assert_cmd::Command::from(Command::new(env!("CARGO_BIN_EXE_luadts")))
}

fn fixture_path(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn read(path: impl AsRef<std::path::Path>) -> String {
    std::fs::read_to_string(path).unwrap()
}

// -- stdin mode --

#[test]
fn stdin_mode_prints_declarations() {
    let input = read(fixture_path("physics.lua"));

    let assert = cmd().write_stdin(input).assert().success();
    let output = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(output.starts_with("// Generated by luadts from <stdin>. Do not edit.\n"));
    assert!(output.contains("type BodyType = \"static\" | \"dynamic\";"));
    assert!(output.contains("declare enum Shape {\n    Circle,\n    Box,\n}"));
    assert!(output.contains("    shape: typeof Shape;\n"));
    assert!(output.contains("    /** Mass in kilograms */\n    mass: number;\n"));
    assert!(output.contains("    getPosition(this: Body): number;\n"));
    assert!(output.contains(
        "    /** @param wake Wake the body up */\n    applyImpulse(this: Body, impulse: number, wake?: boolean): void;\n"
    ));
    assert!(output.contains("    step(this: void, dt: number): void;\n"));
    assert!(output.ends_with("declare const physics: physics;\nexport default physics;\n"));
}

#[test]
fn stdin_mode_point_example() {
    let input = "--- @class point\n--- @field x number\n--- @field y number\n--- @param self point\n--- @return number\nfunction point:length(self) end\n";
    cmd()
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "interface point {\n    x: number;\n    y: number;\n    length(this: point): number;\n}",
        ));
}

#[test]
fn stdin_mode_json_format() {
    let input = read(fixture_path("physics.lua"));

    let assert = cmd().args(["-f", "json"]).write_stdin(input).assert().success();
    let output = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["detectedMainExport"], "physics");
    assert_eq!(value["classes"]["Body"]["fields"][0]["name"], "onCollide");
    assert_eq!(value["aliases"]["BodyType"]["rawTypeExpression"], "\"static\" | \"dynamic\"");
}

#[test]
fn stdin_mode_without_classes_prints_nothing() {
    cmd()
        .write_stdin("---@alias Id string\nlocal x = 1\n")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn invalid_format_fails() {
    cmd()
        .args(["-f", "yaml"])
        .write_stdin("---@class a\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format: yaml"));
}

// -- build mode --

#[test]
fn build_mode_writes_registry_modules() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["build", "-c", &fixture_path("luadts.toml")])
        .args(["-o", dir.path().to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("1 written, 1 skipped, 0 failed"));

    let output = read(&dir.path().join("physics.d.ts"));
    assert!(output.contains("physics.lua. Do not edit."));
    assert!(output.contains("    getPosition(this: Body): LuaMultiReturn<[number, number]>;\n"));
    assert!(output.contains(
        "    onCollide: ((this: Body, other: Body) => boolean) | undefined;\n"
    ));
    assert!(output.contains("    \"new\": ((this: void, kind: BodyType) => Body) | undefined;\n"));
    assert!(output.contains("declare global {\n    var physics: physics;\n}\n"));
    assert!(!dir.path().join("util.d.ts").exists());
}

#[test]
fn build_mode_single_module() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["build", "-c", &fixture_path("luadts.toml"), "-m", "util"])
        .args(["-o", dir.path().to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("0 written, 1 skipped, 0 failed"));

    assert!(!dir.path().join("physics.d.ts").exists());
}

#[test]
fn build_mode_unknown_module_fails() {
    cmd()
        .args(["build", "-c", &fixture_path("luadts.toml"), "-m", "audio"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no module named `audio`"));
}

#[test]
fn build_mode_counts_missing_sources_and_continues() {
    let dir = TempDir::new().unwrap();
    std::fs::copy(fixture_path("physics.lua"), dir.path().join("physics.lua")).unwrap();
    std::fs::write(
        dir.path().join("luadts.toml"),
        "[[module]]\nname = \"gone\"\nsource = \"gone.lua\"\n\n[[module]]\nname = \"physics\"\nsource = \"physics.lua\"\n",
    )
    .unwrap();

    cmd()
        .args(["build", "-c", dir.path().join("luadts.toml").to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("source not found"))
        .stderr(predicate::str::contains("1 written, 0 skipped, 1 failed"));

    assert!(dir.path().join("types/physics.d.ts").exists());
}

#[test]
fn build_mode_rejects_bad_manifest() {
    let mut manifest = NamedTempFile::with_suffix(".toml").unwrap();
    writeln!(
        manifest,
        "[[module]]\nname = \"a\"\nsource = \"a.lua\"\nfilter_classes = [\"a*b\"]"
    )
    .unwrap();

    cmd()
        .args(["build", "-c", manifest.path().to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid registry"));
}

#[test]
fn build_mode_unknown_export_is_a_unit_failure() {
    let dir = TempDir::new().unwrap();
    std::fs::copy(fixture_path("physics.lua"), dir.path().join("physics.lua")).unwrap();
    std::fs::write(
        dir.path().join("luadts.toml"),
        "[[module]]\nname = \"physics\"\nsource = \"physics.lua\"\nmain_export = \"World\"\n",
    )
    .unwrap();

    cmd()
        .args(["build", "-c", dir.path().join("luadts.toml").to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("main export `World`"));
}

// -- files mode --

#[test]
fn files_mode_creates_output() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["files", "-o", dir.path().to_str().unwrap()])
        .arg(fixture_path("physics.lua"))
        .arg(fixture_path("util.lua"))
        .assert()
        .success();

    let output = read(&dir.path().join("physics.d.ts"));
    assert!(output.contains("interface Body {"));
    assert!(output.contains("export default physics;"));
    assert!(!output.contains("declare global"));
    assert!(!dir.path().join("util.d.ts").exists());
}

#[test]
fn files_mode_main_export_and_global() {
    let dir = TempDir::new().unwrap();
    let mut input = NamedTempFile::with_suffix(".lua").unwrap();
    writeln!(input, "---@class Vec\n---@field x number\n---@field label string").unwrap();

    cmd()
        .args(["files", "-o", dir.path().to_str().unwrap()])
        .args(["--main-export", "Vec", "--global"])
        .arg(input.path())
        .assert()
        .success();

    let name = input.path().file_stem().unwrap().to_str().unwrap().to_string();
    let output = read(&dir.path().join(format!("{}.d.ts", name)));
    assert!(output.contains("declare global {\n    var Vec: Vec;\n}\n"));
    assert!(output.contains("declare const Vec: Vec;\nexport default Vec;\n"));
}

#[test]
fn files_mode_expands_directories() {
    let dir = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    std::fs::copy(fixture_path("physics.lua"), dir.path().join("physics.lua")).unwrap();
    std::fs::write(dir.path().join("notes.txt"), "---@class Nope\n").unwrap();

    cmd()
        .args(["files", "-o", out.path().to_str().unwrap()])
        .arg(dir.path())
        .assert()
        .success();

    assert!(out.path().join("physics.d.ts").exists());
    assert!(!out.path().join("notes.d.ts").exists());
}

#[test]
fn files_mode_requires_output() {
    cmd()
        .args(["files"])
        .arg(fixture_path("physics.lua"))
        .assert()
        .failure();
}

#[test]
fn files_mode_no_matches_fails() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["files", "-o", dir.path().to_str().unwrap()])
        .arg(format!("{}/*.nothing", dir.path().display()))
        .assert()
        .failure()
        .stderr(predicate::str::contains("no .lua files matched"));
}
