use std::collections::BTreeSet;
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Command;

use crate::RefOptions;

/// The outcome of one VCS invocation: the command's output on success, or
/// the combined output describing the failure.
pub type VcsOutcome = Result<String, String>;

/// Runs the external VCS executable.
///
/// A non-zero exit status is the only failure signal; the failure text is
/// whatever the command printed, with trailing newlines removed.
pub trait VcsRunner {
	fn run(&self, args: &[String]) -> VcsOutcome;
}

/// Invokes `git` (or a configured substitute) as a subprocess.
#[derive(Debug, Clone)]
pub struct GitCommand {
	program: String,
	repository: Option<PathBuf>,
}

impl GitCommand {
	pub fn new(program: impl Into<String>, repository: Option<PathBuf>) -> Self {
		Self {
			program: program.into(),
			repository,
		}
	}

	pub fn from_options(options: &RefOptions) -> Self {
		Self::new(options.program.clone(), options.repository.clone())
	}
}

impl VcsRunner for GitCommand {
	fn run(&self, args: &[String]) -> VcsOutcome {
		let mut command = Command::new(&self.program);
		command.args(args);
		if let Some(repository) = &self.repository {
			command.current_dir(repository);
		}

		tracing::debug!(program = %self.program, ?args, "running vcs command");

		let output = command
			.output()
			.map_err(|e| format!("failed to execute `{}`: {e}", self.program))?;

		if output.status.success() {
			return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
		}

		let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
		combined.push_str(&String::from_utf8_lossy(&output.stderr));
		let reason = combined.trim_end_matches(['\r', '\n']);

		if reason.is_empty() {
			Err(format!(
				"`{}` exited with status {}",
				self.program,
				output
					.status
					.code()
					.map_or_else(|| "unknown".to_string(), |code| code.to_string())
			))
		} else {
			Err(reason.to_string())
		}
	}
}

/// Paths reported as different between two revisions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangedFileSet(BTreeSet<String>);

impl ChangedFileSet {
	/// Build the set from `diff --name-only` output, one path per line.
	pub fn from_output(output: &str) -> Self {
		Self(
			output
				.lines()
				.filter(|line| !line.is_empty())
				.map(str::to_string)
				.collect(),
		)
	}

	pub fn contains(&self, path: &str) -> bool {
		self.0.contains(path)
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

/// Memoizing front for a [`VcsRunner`].
///
/// Each distinct argument list reaches the runner at most once; later calls
/// replay the recorded outcome, failures included. A gateway belongs to a
/// single document run and is never shared between documents.
#[derive(Debug)]
pub struct VcsGateway<R> {
	runner: R,
	cache: HashMap<String, VcsOutcome>,
	invocations: usize,
}

impl<R: VcsRunner> VcsGateway<R> {
	pub fn new(runner: R) -> Self {
		Self {
			runner,
			cache: HashMap::new(),
			invocations: 0,
		}
	}

	/// The content of `path` as it existed at `revision` (`show rev:path`).
	pub fn fetch_file_at(&mut self, revision: &str, path: &str) -> VcsOutcome {
		self.query(vec!["show".to_string(), format!("{revision}:{path}")])
	}

	/// Paths that differ between `from` and `to` (`diff --name-only`).
	pub fn changed_files(&mut self, from: &str, to: &str) -> Result<ChangedFileSet, String> {
		self.query(vec![
			"diff".to_string(),
			"--name-only".to_string(),
			from.to_string(),
			to.to_string(),
		])
		.map(|output| ChangedFileSet::from_output(&output))
	}

	/// Number of times the underlying runner was actually invoked.
	pub fn invocations(&self) -> usize {
		self.invocations
	}

	pub fn runner(&self) -> &R {
		&self.runner
	}

	fn query(&mut self, args: Vec<String>) -> VcsOutcome {
		let key = args.join("\u{1f}");

		if let Some(outcome) = self.cache.get(&key) {
			tracing::debug!(?args, "vcs cache hit");
			return outcome.clone();
		}

		self.invocations += 1;
		let outcome = self.runner.run(&args);
		self.cache.insert(key, outcome.clone());
		outcome
	}
}
