//! Integration tests for the `regdef` binary.
//!
//! A shell script stands in for `docker` so trust inspection runs without a
//! daemon or network.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const INSPECT_OUTPUT: &str = r#"[{"AdministrativeKeys":[{"Name":"Root","Keys":[{"ID":"KEY1"}]}]}]"#;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let ws = Self {
            dir: TempDir::new().unwrap(),
        };
        ws.write("template.json", r#"{"a":"x"}"#);
        ws.write("vendor.pub", "VENDOR");
        ws.write(
            "docker/trust/tuf/docker.io/acme/widget/metadata/root.json",
            r#"{"signed":{"keys":{"KEY1":{"keyval":{"public":"PUBKEY"}}}}}"#,
        );
        ws
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    fn write(&self, rel: &str, content: &str) {
        let path = self.path(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[cfg(unix)]
    fn fake_docker(&self, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = self.path("bin/docker");
        self.write("bin/docker", &format!("#!/bin/sh\n{body}\n"));
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    /// `regdef` isolated from the caller's environment, on the bundled template.
    fn regdef_bare(&self) -> Command {
        let mut cmd = Command::cargo_bin("regdef").unwrap();
        cmd.current_dir(self.dir.path())
            .env_remove("REGDEF_TEMPLATE")
            .env_remove("REGDEF_DOCKER_BIN")
            .env_remove("DOCKER_CONFIG")
            .arg("--trust-dir")
            .arg(self.path("docker"));
        cmd
    }

    fn regdef(&self) -> Command {
        let mut cmd = self.regdef_bare();
        cmd.arg("--template").arg(self.path("template.json"));
        cmd
    }
}

fn inspect_ok() -> String {
    format!(
        "if [ \"$1\" = trust ] && [ \"$2\" = inspect ] && [ \"$3\" = acme/widget ]; then\n  printf '%s' '{INSPECT_OUTPUT}'\n  exit 0\nfi\necho \"unexpected: $*\" >&2\nexit 1"
    )
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[cfg(unix)]
#[test]
fn test_build_writes_and_prints_definition() {
    let ws = Workspace::new();
    let docker = ws.fake_docker(&inspect_ok());
    let out = ws.path("out.json");

    let assert = ws
        .regdef()
        .arg("--docker-bin")
        .arg(&docker)
        .args(["hub", "acme", "widget", "vendor.pub", "--dockerpass", "pw"])
        .arg("--outputfile")
        .arg(&out)
        .assert()
        .success();

    let written = fs::read_to_string(&out).unwrap();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert_eq!(stdout.trim_end(), written);

    assert_eq!(
        read_json(&out),
        serde_json::json!({
            "a": "x",
            "repository_name": "acme/widget",
            "docker_username": "acme",
            "docker_password": "pw",
            "public_key_id": "KEY1",
            "public_key": "PUBKEY",
            "vendor_key": "VENDOR"
        })
    );
    assert!(written.starts_with("{\n   \"a\": \"x\",\n   \"docker_password\""));
}

#[cfg(unix)]
#[test]
fn test_default_output_path_in_working_directory() {
    let ws = Workspace::new();
    let docker = ws.fake_docker(&inspect_ok());

    ws.regdef()
        .arg("--docker-bin")
        .arg(&docker)
        .args(["hub", "acme", "widget", "vendor.pub", "--dockerpass", "pw"])
        .args(["--dockerid", "robot"])
        .assert()
        .success();

    let v = read_json(&ws.path("hpvs-fhe-registration.txt"));
    assert_eq!(v["docker_username"], "robot");
}

#[cfg(unix)]
#[test]
fn test_repeated_runs_are_byte_identical() {
    let ws = Workspace::new();
    let docker = ws.fake_docker(&inspect_ok());

    let run = |name: &str| {
        ws.regdef()
            .arg("--docker-bin")
            .arg(&docker)
            .args(["hub", "acme", "widget", "vendor.pub", "--dockerpass", "pw"])
            .arg("--outputfile")
            .arg(ws.path(name))
            .assert()
            .success();
        fs::read(ws.path(name)).unwrap()
    };
    assert_eq!(run("first.json"), run("second.json"));
}

#[cfg(unix)]
#[test]
fn test_inspection_failure_reports_stage() {
    let ws = Workspace::new();
    let docker = ws.fake_docker("echo 'notary: connection refused' >&2\nexit 1");

    ws.regdef()
        .arg("--docker-bin")
        .arg(&docker)
        .args(["hub", "acme", "widget", "vendor.pub", "--dockerpass", "pw"])
        .assert()
        .code(7)
        .stderr(predicate::str::contains("trust inspection"))
        .stderr(predicate::str::contains("connection refused"));

    assert!(!ws.path("hpvs-fhe-registration.txt").exists());
}

#[cfg(unix)]
#[test]
fn test_unknown_root_key_fails_without_output() {
    let ws = Workspace::new();
    let docker = ws.fake_docker(
        r#"printf '%s' '[{"AdministrativeKeys":[{"Name":"Root","Keys":[{"ID":"NOPE"}]}]}]'"#,
    );

    ws.regdef()
        .arg("--docker-bin")
        .arg(&docker)
        .args(["hub", "acme", "widget", "vendor.pub", "--dockerpass", "pw"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("public key"));

    assert!(!ws.path("hpvs-fhe-registration.txt").exists());
}

#[cfg(unix)]
#[test]
fn test_bundled_template_without_template_option() {
    let ws = Workspace::new();
    let docker = ws.fake_docker(&inspect_ok());
    let out = ws.path("out.json");

    ws.regdef_bare()
        .arg("--docker-bin")
        .arg(&docker)
        .args(["hub", "acme", "widget", "vendor.pub", "--dockerpass", "pw"])
        .arg("--outputfile")
        .arg(&out)
        .assert()
        .success();

    assert_eq!(
        read_json(&out),
        serde_json::json!({
            "repository_name": "acme/widget",
            "docker_username": "acme",
            "docker_password": "pw",
            "public_key_id": "KEY1",
            "public_key": "PUBKEY",
            "vendor_key": "VENDOR"
        })
    );
}

#[test]
fn test_missing_template_fails_before_inspection() {
    let ws = Workspace::new();
    // Inspection would fail with a different stage if it ran.
    ws.regdef_bare()
        .arg("--template")
        .arg(ws.path("missing.template"))
        .args(["--docker-bin", "regdef-no-such-docker"])
        .args(["hub", "acme", "widget", "vendor.pub", "--dockerpass", "pw"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error: template:"));
}

#[cfg(unix)]
#[test]
fn test_missing_vendor_key_file() {
    let ws = Workspace::new();
    let docker = ws.fake_docker(&inspect_ok());

    ws.regdef()
        .arg("--docker-bin")
        .arg(&docker)
        .args(["hub", "acme", "widget", "absent.pub", "--dockerpass", "pw"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("vendor key"));
}

#[test]
fn test_prompt_without_terminal_fails() {
    let ws = Workspace::new();
    // No --dockerpass and no TTY: the password prompt cannot run.
    ws.regdef()
        .args(["--docker-bin", "regdef-no-such-docker"])
        .args(["hub", "acme", "widget", "vendor.pub"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("credentials"));
}

#[test]
fn test_version() {
    Command::cargo_bin("regdef")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_missing_arguments_is_usage_error() {
    Command::cargo_bin("regdef")
        .unwrap()
        .args(["hub", "acme"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("PATH_TO_SIGNING_KEY"));
}
