#![allow(dead_code)]

use std::path::Path;
use std::process::Command as StdCommand;

use assert_cmd::Command;
use mdref_core::AnyEmptyResult;
use mdref_core::AnyResult;
use tempfile::TempDir;

pub const STABLE_SOURCE: &str = "pub fn greet() {\n\tprintln!(\"hi\");\n}\n";

pub fn mdref_cmd() -> Command {
	let mut cmd = Command::new(env!("CARGO_BIN_EXE_mdref"));
	cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
	cmd
}

pub fn git_available() -> bool {
	StdCommand::new("git")
		.arg("--version")
		.output()
		.is_ok_and(|output| output.status.success())
}

pub fn git(repo: &Path, args: &[&str]) -> AnyEmptyResult {
	let output = StdCommand::new("git")
		.args([
			"-c",
			"user.name=mdref",
			"-c",
			"user.email=mdref@example.com",
			"-c",
			"commit.gpgsign=false",
			"-c",
			"tag.gpgsign=false",
		])
		.args(args)
		.current_dir(repo)
		.output()?;

	if output.status.success() {
		Ok(())
	} else {
		Err(format!(
			"git {} failed: {}",
			args.join(" "),
			String::from_utf8_lossy(&output.stderr)
		)
		.into())
	}
}

/// A repository where tag `v1` holds `stable.rs` and `changed.rs`, and a later
/// commit on `HEAD` modifies `changed.rs`.
pub fn sample_repo() -> AnyResult<TempDir> {
	let tmp = tempfile::tempdir()?;
	let root = tmp.path();

	git(root, &["init", "-q"])?;
	std::fs::write(root.join("stable.rs"), STABLE_SOURCE)?;
	std::fs::write(root.join("changed.rs"), "fn old() {}\n")?;
	git(root, &["add", "."])?;
	git(root, &["commit", "-q", "-m", "initial"])?;
	git(root, &["tag", "v1"])?;
	std::fs::write(root.join("changed.rs"), "fn new() {}\n")?;
	git(root, &["commit", "-q", "-am", "change"])?;

	Ok(tmp)
}

pub fn write_doc(root: &Path, relative: &str, content: &str) -> AnyEmptyResult {
	let path = root.join(relative);
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent)?;
	}
	std::fs::write(path, content)?;
	Ok(())
}
