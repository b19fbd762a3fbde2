use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use crate::RefOptions;
use crate::VcsOutcome;
use crate::VcsRunner;

pub(crate) const SAMPLE_REVISION: &str = "developing";
pub(crate) const SAMPLE_PATH: &str = "file.txt";
pub(crate) const SAMPLE_CONTENT: &str = "line 1\n\tline 2\n\tline 3\nline 4";

/// In-memory stand-in for `git` that answers `show` and `diff --name-only`
/// from preloaded data and records every call it receives.
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeVcs {
	files: HashMap<String, String>,
	changes: HashMap<(String, String), Vec<String>>,
	calls: Arc<Mutex<Vec<Vec<String>>>>,
}

impl FakeVcs {
	pub(crate) fn with_file(mut self, revision: &str, path: &str, content: &str) -> Self {
		self.files
			.insert(format!("{revision}:{path}"), content.to_string());
		self
	}

	pub(crate) fn with_changes(mut self, from: &str, to: &str, paths: &[&str]) -> Self {
		self.changes.insert(
			(from.to_string(), to.to_string()),
			paths.iter().map(ToString::to_string).collect(),
		);
		self
	}

	pub(crate) fn calls(&self) -> Vec<Vec<String>> {
		self.calls
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.clone()
	}

	pub(crate) fn call_count(&self) -> usize {
		self.calls().len()
	}

	pub(crate) fn calls_to(&self, command: &str) -> usize {
		self.calls()
			.iter()
			.filter(|args| args.first().is_some_and(|arg| arg == command))
			.count()
	}
}

impl VcsRunner for FakeVcs {
	fn run(&self, args: &[String]) -> VcsOutcome {
		self.calls
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.push(args.to_vec());

		match args {
			[command, object] if command == "show" => {
				self.files.get(object).cloned().ok_or_else(|| {
					format!("fatal: path '{object}' does not exist")
				})
			}
			[command, flag, from, to] if command == "diff" && flag == "--name-only" => {
				self.changes
					.get(&(from.clone(), to.clone()))
					.map(|paths| {
						paths
							.iter()
							.map(|path| format!("{path}\n"))
							.collect::<String>()
					})
					.ok_or_else(|| format!("fatal: bad revision '{from}'"))
			}
			_ => Err(format!("unknown command: {}", args.join(" "))),
		}
	}
}

/// The sample file at `developing`, unchanged relative to `master`.
pub(crate) fn sample_vcs() -> FakeVcs {
	FakeVcs::default()
		.with_file(SAMPLE_REVISION, SAMPLE_PATH, SAMPLE_CONTENT)
		.with_changes(SAMPLE_REVISION, "master", &[])
}

/// The sample file at `developing`, modified since on `master`.
pub(crate) fn stale_sample_vcs() -> FakeVcs {
	FakeVcs::default()
		.with_file(SAMPLE_REVISION, SAMPLE_PATH, SAMPLE_CONTENT)
		.with_changes(SAMPLE_REVISION, "master", &["other.txt", SAMPLE_PATH])
}

pub(crate) fn default_options() -> RefOptions {
	RefOptions::default()
}

pub(crate) fn options_without_stale_check() -> RefOptions {
	RefOptions {
		check_stale: false,
		..RefOptions::default()
	}
}

pub(crate) fn sample_directive(suffix: &str) -> String {
	format!("<!-- {{{{csharp|git|{SAMPLE_REVISION}|{SAMPLE_PATH}{suffix}}}}} -->")
}
