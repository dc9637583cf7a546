use assert_cmd::prelude::*;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

fn has_git() -> bool {
    Command::new("git").arg("--version").output().is_ok()
}

fn git(dir: &Path, args: &[&str]) {
    assert!(Command::new("git")
        .args(args)
        .current_dir(dir)
        .status()
        .unwrap()
        .success());
}

fn init_git_repo(dir: &Path) {
    git(dir, &["init"]);
    git(dir, &["config", "core.autocrlf", "false"]);
    git(dir, &["config", "user.email", "you@example.com"]);
    git(dir, &["config", "user.name", "Your Name"]);
    git(dir, &["config", "tag.gpgsign", "false"]);
    git(dir, &["config", "commit.gpgsign", "false"]);
}

fn commit_file(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut f = File::create(&path).unwrap();
    f.write_all(content.as_bytes()).unwrap();
    f.sync_all().unwrap();
    git(dir, &["add", "."]);
    git(dir, &["commit", "-m", &format!("add {name}")]);
}

/// Three releases across two majors, then one unreleased commit.
fn released_repo(dir: &Path) {
    init_git_repo(dir);
    commit_file(
        dir,
        "CHANGELOG.md",
        "# Changelog\n\n## [Unreleased]\n- polish\n\n## [v2.0.0]\n- rewrite\n\n## [v1.1.0]\n- fix\n\n## [v1.0.0]\n- first\n",
    );
    git(dir, &["tag", "v1.0.0"]);
    commit_file(dir, "src/a.rs", "fn a() {}\n");
    git(dir, &["tag", "v1.1.0"]);
    commit_file(dir, "src/b.rs", "fn b() {}\nfn c() {}\n");
    git(dir, &["tag", "v2.0.0"]);
    commit_file(dir, "src/d.rs", "fn d() {}\n");
}

#[test]
fn json_report_resolves_previous_major() {
    if !has_git() {
        return;
    }
    let dir = tempdir().unwrap();
    released_repo(dir.path());

    let mut cmd = Command::cargo_bin("repo-report").unwrap();
    cmd.arg("--repo")
        .arg(dir.path())
        .args(["stats", "--from", "latest-of-major-1", "--no-codebase", "--json"]);
    let out = cmd.assert().success().get_output().stdout.clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();

    assert_eq!(v["config"]["diff_tag"], "v1.1.0");
    assert_eq!(v["config"]["report_tag"], "HEAD");
    assert!(v["technologies"].is_null());

    let contributors = v["contributors"].as_array().unwrap();
    assert_eq!(contributors.len(), 1);
    assert_eq!(contributors[0]["name"], "Your Name");
    assert_eq!(contributors[0]["commits"], 2);
    assert_eq!(contributors[0]["additions"], 3);

    let changelog: Vec<&str> = v["changelog"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|l| l.as_str())
        .collect();
    assert_eq!(changelog.first(), Some(&"## [Unreleased]"));
    assert!(changelog.contains(&"- rewrite"));
    assert!(!changelog.contains(&"- fix"));
}

#[test]
fn markdown_report_from_latest_tag() {
    if !has_git() {
        return;
    }
    let dir = tempdir().unwrap();
    released_repo(dir.path());

    let mut cmd = Command::cargo_bin("repo-report").unwrap();
    cmd.current_dir(dir.path())
        .args(["stats", "--title", "Release", "--no-codebase"]);
    let out = cmd.assert().success().get_output().stdout.clone();
    let text = String::from_utf8(out).unwrap();

    assert!(text.starts_with("# Release for HEAD - "));
    assert!(text.contains("## Changelog since v2.0.0"));
    assert!(text.contains("- polish"));
    assert!(!text.contains("- rewrite"));
    assert!(text.contains("## Contributors that brought us from v2.0.0 to here"));
    assert!(text.contains("| Your Name |       1 |"));
    assert!(text.contains("[image-0]: https://www.gravatar.com/avatar/"));
}

fn commit_file_at(dir: &Path, name: &str, content: &str, date: &str) {
    fs::write(dir.join(name), content).unwrap();
    git(dir, &["add", "."]);
    assert!(Command::new("git")
        .args(["commit", "-m", &format!("add {name}")])
        .env("GIT_AUTHOR_DATE", date)
        .env("GIT_COMMITTER_DATE", date)
        .current_dir(dir)
        .status()
        .unwrap()
        .success());
}

/// Same release train as `released_repo`, with pinned commit dates.
fn dated_repo(dir: &Path) {
    init_git_repo(dir);
    commit_file_at(dir, "a.txt", "a\n", "2021-01-10T12:00:00+0000");
    git(dir, &["tag", "v1.0.0"]);
    commit_file_at(dir, "b.txt", "b\n", "2021-03-10T12:00:00+0000");
    git(dir, &["tag", "v1.1.0"]);
    commit_file_at(dir, "c.txt", "c\n", "2021-06-10T12:00:00+0000");
    git(dir, &["tag", "v2.0.0"]);
    commit_file_at(dir, "d.txt", "d\n", "2021-09-10T12:00:00+0000");
}

#[test]
fn date_specifier_recovers_release_tag() {
    if !has_git() {
        return;
    }
    let dir = tempdir().unwrap();
    dated_repo(dir.path());

    let mut cmd = Command::cargo_bin("repo-report").unwrap();
    cmd.arg("--repo")
        .arg(dir.path())
        .args([
            "stats",
            "--from",
            "v1.0.0",
            "--till",
            "2021-04-01",
            "--no-codebase",
            "--no-changelog",
            "--json",
        ]);
    let out = cmd.assert().success().get_output().stdout.clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();

    assert_eq!(v["config"]["report_tag"], "2021-04-01");
    assert_eq!(v["config"]["release_tag"], "v1.1.0");
    assert_eq!(v["config"]["report_date"], "2021-03-10");
    assert_eq!(v["contributors"][0]["commits"], 1);
}

#[test]
fn date_after_last_release_resolves_untagged_commit() {
    if !has_git() {
        return;
    }
    let dir = tempdir().unwrap();
    released_repo(dir.path());

    let mut cmd = Command::cargo_bin("repo-report").unwrap();
    cmd.arg("--repo")
        .arg(dir.path())
        .args([
            "stats",
            "--from",
            "v1.0.0",
            "--till",
            "2090-01-01",
            "--no-codebase",
            "--no-changelog",
            "--json",
        ]);
    let out = cmd.assert().success().get_output().stdout.clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();

    assert_eq!(v["config"]["report_tag"], "2090-01-01");
    assert!(v["config"]["commit"].as_str().is_some());
    assert!(v["config"]["release_tag"].is_null());
    assert_eq!(v["contributors"][0]["commits"], 3);
}

#[test]
fn missing_tags_abort_with_diagnostic() {
    if !has_git() {
        return;
    }
    let dir = tempdir().unwrap();
    init_git_repo(dir.path());
    commit_file(dir.path(), "README.md", "hello\n");

    let mut cmd = Command::cargo_bin("repo-report").unwrap();
    cmd.arg("--repo").arg(dir.path()).arg("stats");
    let assert = cmd.assert().failure();
    let stderr = String::from_utf8(assert.get_output().stderr.clone()).unwrap();
    assert!(stderr.contains("no tag found"));
}

#[test]
fn unknown_baseline_skips_delta_sections() {
    if !has_git() {
        return;
    }
    let dir = tempdir().unwrap();
    released_repo(dir.path());

    let mut cmd = Command::cargo_bin("repo-report").unwrap();
    cmd.arg("--repo")
        .arg(dir.path())
        .args(["stats", "--from", "v9.9.9", "--json"]);
    let out = cmd.assert().success().get_output().stdout.clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();

    assert!(v["config"]["diff_commit"].is_null());
    assert!(v["technologies"].is_null());
    assert!(v["contributors"].is_null());
}
