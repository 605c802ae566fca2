use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::cargo_bin("glyphguard").unwrap()
}

fn write(root: &Path, rel: &str, body: &str) {
    let p = root.join(rel);
    fs::create_dir_all(p.parent().unwrap()).unwrap();
    fs::write(p, body).unwrap();
}

#[test]
fn clean_tree_exits_zero() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "src/index.ts", "export const x = 1;\n");
    cmd().arg(tmp.path()).assert().code(0).stdout(contains("clean")).stderr(predicate::str::is_empty());
}

#[test]
fn blocking_finding_exits_two_on_stderr() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "a.ts", "if (role === 'user\u{202E}') {}\n");
    cmd()
        .arg(tmp.path())
        .assert()
        .code(2)
        .stderr(contains("a.ts: 1 occurrence(s)"))
        .stdout(contains("clean").not());
}

#[test]
fn advisory_finding_exits_zero_on_stdout() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "README.md", "hello\u{200B}\n");
    cmd()
        .arg(tmp.path())
        .assert()
        .code(0)
        .stdout(contains("warning").and(contains("README.md")).and(contains("clean")));
}

#[test]
fn defaults_to_current_directory() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "lib/x.js", "\u{2067}");
    cmd().current_dir(tmp.path()).assert().code(2).stderr(contains("lib/x.js"));
}

#[test]
fn missing_root_is_internal_failure() {
    let tmp = TempDir::new().unwrap();
    cmd()
        .arg(tmp.path().join("nope"))
        .assert()
        .code(1)
        .stderr(contains("error: scan failed"));
}

#[test]
fn bad_arguments_do_not_collide_with_blocking_code() {
    cmd().arg("--no-such-flag").assert().code(1);
}

#[test]
fn invalid_thread_counts_are_rejected() {
    let tmp = TempDir::new().unwrap();
    for bad in ["0", "abc"] {
        cmd()
            .arg(tmp.path())
            .args(["--threads", bad])
            .assert()
            .code(1)
            .stderr(contains("--threads"));
    }
}

#[test]
fn nul_byte_does_not_hide_override_in_source() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "a.js", "if (role === 'user\u{202E}') {} // \u{0}\n");
    cmd().arg(tmp.path()).assert().code(2).stderr(contains("a.js: 1 occurrence(s)"));
}

#[cfg(unix)]
#[test]
fn unreadable_root_is_internal_failure() {
    use std::os::unix::fs::PermissionsExt;

    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("locked");
    write(&root, "a.ts", "x\u{202E}");
    fs::set_permissions(&root, fs::Permissions::from_mode(0o000)).unwrap();
    // 以 root 运行时权限位不生效
    let privileged = fs::read_dir(&root).is_ok();
    let assert = cmd().arg(&root).assert();
    fs::set_permissions(&root, fs::Permissions::from_mode(0o755)).unwrap();

    if privileged {
        return;
    }
    assert.code(1).stderr(contains("cannot be read"));
}

#[test]
fn allow_flag_suppresses_codepoint() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "a.ts", "x\u{200F}y");
    cmd().arg(tmp.path()).assert().code(2);
    cmd().arg(tmp.path()).args(["--allow", "U+200F"]).assert().code(0);
}

#[test]
fn config_file_overrides_tables() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "tree/a.ts", "x\u{202E}y");
    write(tmp.path(), "glyphguard.toml", "source_extensions = [\"rs\"]\ndoc_extensions = [\"ts\"]\n");
    cmd()
        .arg(tmp.path().join("tree"))
        .arg("--config")
        .arg(tmp.path().join("glyphguard.toml"))
        .assert()
        .code(0)
        .stdout(contains("warning").and(contains("a.ts")));
}

#[test]
fn invalid_config_is_internal_failure() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "bad.toml", "unknown_field = 1\n");
    cmd()
        .arg(tmp.path())
        .arg("--config")
        .arg(tmp.path().join("bad.toml"))
        .assert()
        .code(1)
        .stderr(contains("load config"));
}

#[test]
fn json_format_reports_exit_code() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "a.ts", "\u{2066}");
    let out = cmd()
        .arg(tmp.path())
        .args(["--format", "json", "--threads", "2"])
        .assert()
        .code(2)
        .get_output()
        .stdout
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&out).expect("valid json output");
    assert_eq!(v["exit_code"], 2);
    assert_eq!(v["blocking"][0]["path"], "a.ts");
    assert_eq!(v["blocking"][0]["samples"][0], "U+2066");
}

#[test]
fn repeated_runs_are_byte_identical() {
    let tmp = TempDir::new().unwrap();
    for i in 0..30 {
        write(tmp.path(), &format!("d{}/f{i}.py", i % 4), "x = 1  # \u{202D}\n");
    }
    let a = cmd().arg(tmp.path()).assert().code(2).get_output().clone();
    let b = cmd().arg(tmp.path()).assert().code(2).get_output().clone();
    assert_eq!(a.stdout, b.stdout);
    assert_eq!(a.stderr, b.stderr);
}
