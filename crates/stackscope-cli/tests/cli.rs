use assert_cmd::Command;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const DUMP: &str = "goroutine 5 [chan receive, 2 minutes]:
pkg.Worker()
\t/build/app/worker.go:4 +0x10
created by pkg.Start
\t/build/app/start.go:5 +0x33

goroutine 1 [running]:
main.main()
\t/build/app/main.go:3 +0x20

goroutine 9 [chan receive, 20 minutes]:
pkg.Worker()
\t/build/app/worker.go:4 +0x10
created by pkg.Start
\t/build/app/start.go:5 +0x33
";

const WORKER_GO: &str = "package pkg

func Worker() {
\t<-make(chan int)
}
";

#[allow(deprecated)]
fn stackscope() -> Command {
    let mut cmd = Command::cargo_bin("stackscope").expect("binary");
    for var in [
        "STACKSCOPE_ROOT",
        "STACKSCOPE_GOROOT",
        "STACKSCOPE_GOPATH",
        "STACKSCOPE_MARKUP_LIMIT",
        "STACKSCOPE_WRAP",
    ] {
        cmd.env_remove(var);
    }
    cmd.arg("--quiet");
    cmd
}

fn json(stdout: &[u8]) -> Value {
    serde_json::from_slice(stdout).expect("valid json")
}

fn write_dump(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("dump.txt");
    fs::write(&path, DUMP).unwrap();
    path
}

#[test]
fn parse_reads_stdin_and_sorts() {
    let output = stackscope()
        .args(["--root", "/build/app", "parse"])
        .write_stdin(DUMP)
        .output()
        .expect("command run");
    assert!(output.status.success());

    let body = json(&output.stdout);
    let ids: Vec<u64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 9, 5]);
    assert_eq!(body[0]["callStack"][0]["root"], "PROJECT");
    assert_eq!(body[0]["callStack"][0]["file"], "main.go");
    assert_eq!(body[1]["duration"], 1_200_000_000_000u64);
    assert_eq!(body[1]["callStack"][1]["origin"], true);
    assert!(body[1]["callStack"][0].get("prefix").is_none());
}

#[test]
fn group_merges_identical_stacks() {
    let dir = tempdir().unwrap();
    let dump = write_dump(dir.path());
    let output = stackscope()
        .args(["--root", "/build/app", "group"])
        .arg(&dump)
        .output()
        .expect("command run");
    assert!(output.status.success());

    let groups = json(&output.stdout);
    let groups = groups.as_array().unwrap();
    assert_eq!(groups.len(), 2);
    let workers = groups
        .iter()
        .find(|g| g["calls"].as_array().unwrap().len() == 2)
        .expect("worker group");
    assert_eq!(workers["stack"].as_array().unwrap().len(), 2);
    assert_eq!(workers["calls"][0][0]["method"], "Worker");
}

#[test]
fn duration_filter_skips_short_waits() {
    let dir = tempdir().unwrap();
    let dump = write_dump(dir.path());
    let output = stackscope()
        .args(["--root", "/build/app", "parse", "--min-minutes", "10"])
        .arg(&dump)
        .output()
        .expect("command run");
    assert!(output.status.success());
    let body = json(&output.stdout);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], 9);
}

#[test]
fn highlights_from_local_checkout_via_config() {
    let dir = tempdir().unwrap();
    let checkout = dir.path().join("checkout");
    fs::create_dir_all(&checkout).unwrap();
    fs::write(checkout.join("worker.go"), WORKER_GO).unwrap();
    fs::write(checkout.join("start.go"), "package pkg\n\n\n\nfunc Start() { go Worker() }\n").unwrap();
    fs::write(checkout.join("main.go"), "package main\n\nfunc main() {}\n").unwrap();

    let config = dir.path().join("stackscope.toml");
    fs::write(
        &config,
        format!(
            "[local]\nroot = {:?}\n\n[remote]\nroot = \"/build/app\"\n\n[markup]\nwrap_size = 1\n",
            checkout.to_string_lossy()
        ),
    )
    .unwrap();
    let dump = write_dump(dir.path());

    let output = stackscope()
        .arg("--config")
        .arg(&config)
        .args(["parse", "--markup-limit", "2"])
        .arg(&dump)
        .output()
        .expect("command run");
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let body = json(&output.stdout);
    let worker_line = body[1]["callStack"][0]["prefix"].as_str().unwrap();
    assert!(worker_line.contains("lnt hl"));
    assert!(body[1]["callStack"][0]["suffix"].as_str().unwrap().contains('}'));
    // past the markup limit
    assert!(body[2]["callStack"][0].get("prefix").is_none());
}

#[test]
fn wrap_flag_overrides_environment() {
    let dir = tempdir().unwrap();
    let dump = write_dump(dir.path());
    // highlighting would fail: nothing exists under the local root
    stackscope()
        .env("STACKSCOPE_WRAP", "3")
        .args(["--root", "/build/app", "parse", "--wrap", "-1"])
        .arg(&dump)
        .assert()
        .success();

    stackscope()
        .env("STACKSCOPE_WRAP", "3")
        .args(["--root", "/build/app", "parse"])
        .arg(&dump)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to highlight call sites"));
}

#[test]
fn unknown_root_fails_with_offending_path() {
    stackscope()
        .args(["--root", "/elsewhere", "parse"])
        .write_stdin(DUMP)
        .assert()
        .failure()
        .stderr(predicate::str::contains("/build/app/worker.go"));
}

#[test]
fn relative_root_is_rejected() {
    stackscope()
        .args(["--root", "build/app", "parse"])
        .write_stdin(DUMP)
        .assert()
        .failure()
        .stderr(predicate::str::contains("local.root must be an absolute path"));
}

#[test]
fn missing_input_file_reports_path() {
    stackscope()
        .args(["parse", "/definitely/not/here.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read dump"));
}
