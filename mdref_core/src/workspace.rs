use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use ignore::gitignore::Gitignore;
use ignore::gitignore::GitignoreBuilder;

use crate::DocumentReport;
use crate::MdrefError;
use crate::MdrefResult;
use crate::RefOptions;
use crate::VcsGateway;
use crate::VcsRunner;
use crate::process_file;

const MARKDOWN_EXTENSION: &str = "md";

/// The result of processing one file in directory mode.
#[derive(Debug)]
pub struct FileOutcome {
	pub source: PathBuf,
	pub destination: PathBuf,
	pub result: MdrefResult<DocumentReport>,
}

/// Outcomes for every markdown file found in directory mode, in discovery
/// order, followed by any path the walk could not read.
#[derive(Debug, Default)]
pub struct DirectoryReport {
	pub outcomes: Vec<FileOutcome>,
}

impl DirectoryReport {
	/// Returns true if every file was processed successfully.
	pub fn is_ok(&self) -> bool {
		self.outcomes.iter().all(|outcome| outcome.result.is_ok())
	}

	pub fn failures(&self) -> impl Iterator<Item = &FileOutcome> {
		self.outcomes.iter().filter(|outcome| outcome.result.is_err())
	}

	pub fn successes(&self) -> impl Iterator<Item = (&FileOutcome, &DocumentReport)> {
		self.outcomes
			.iter()
			.filter_map(|outcome| outcome.result.as_ref().ok().map(|report| (outcome, report)))
	}

	/// Total number of stale references across successful files.
	pub fn stale_count(&self) -> usize {
		self.successes().map(|(_, report)| report.stale.len()).sum()
	}
}

/// Where `source` (found under `input_root`) is written under `output_root`.
pub fn destination_for(input_root: &Path, output_root: &Path, source: &Path) -> PathBuf {
	output_root.join(source.strip_prefix(input_root).unwrap_or(source))
}

/// Process the file at `source` and write the result to `destination`,
/// creating parent directories as needed.
///
/// The file gets its own [`VcsGateway`], so its cache lives exactly as long as
/// this call.
pub fn process_path<R: VcsRunner>(
	source: &Path,
	destination: &Path,
	runner: R,
	options: &RefOptions,
) -> MdrefResult<DocumentReport> {
	let input = BufReader::new(File::open(source)?);
	let mut gateway = VcsGateway::new(runner);

	process_file(input, &mut gateway, options, || {
		if let Some(parent) = destination.parent() {
			std::fs::create_dir_all(parent)?;
		}
		File::create(destination)
	})
}

/// Process every markdown file below `input_root` in parallel, mirroring the
/// tree under `output_root`.
///
/// Each file runs as its own blocking task with a runner from
/// `runner_factory`. A failing file is recorded in the report and never stops
/// its siblings; the call returns once every spawned task has reported.
/// Paths the directory walk could not read are reported after the files, as
/// failed outcomes.
pub async fn process_directory<R, F>(
	input_root: &Path,
	output_root: &Path,
	options: &RefOptions,
	runner_factory: F,
) -> MdrefResult<DirectoryReport>
where
	R: VcsRunner + Send + 'static,
	F: Fn() -> R + Send + Sync + 'static,
{
	let Discovery { files, failures } = discover_markdown_files(input_root, options)?;
	let runner_factory = Arc::new(runner_factory);
	let options = Arc::new(options.clone());
	let mut tasks = Vec::with_capacity(files.len());

	for source in files {
		let destination = destination_for(input_root, output_root, &source);
		let runner_factory = Arc::clone(&runner_factory);
		let options = Arc::clone(&options);
		let task_source = source.clone();
		let task_destination = destination.clone();

		let handle = tokio::task::spawn_blocking(move || {
			let result = process_path(&task_source, &task_destination, runner_factory(), &options);
			match &result {
				Ok(report) => {
					tracing::info!(
						file = %task_source.display(),
						references = report.references,
						stale = report.stale.len(),
						"processed"
					);
				}
				Err(error) => {
					tracing::error!(file = %task_source.display(), %error, "failed");
				}
			}
			result
		});

		tasks.push((source, destination, handle));
	}

	let mut report = DirectoryReport {
		outcomes: Vec::with_capacity(tasks.len() + failures.len()),
	};

	for (source, destination, handle) in tasks {
		let result = handle.await.unwrap_or_else(|error| {
			Err(MdrefError::Worker {
				path: source.display().to_string(),
				reason: error.to_string(),
			})
		});

		report.outcomes.push(FileOutcome {
			source,
			destination,
			result,
		});
	}

	for (source, error) in failures {
		tracing::error!(path = %source.display(), %error, "failed during discovery");
		report.outcomes.push(FileOutcome {
			destination: destination_for(input_root, output_root, &source),
			source,
			result: Err(error),
		});
	}

	Ok(report)
}

/// Markdown files found below a root, plus the paths the walk could not get
/// through.
#[derive(Debug, Default)]
pub struct Discovery {
	/// Sorted for deterministic ordering.
	pub files: Vec<PathBuf>,
	/// Directories or entries that could not be read, and symlink cycles.
	pub failures: Vec<(PathBuf, MdrefError)>,
}

/// Walk `root` for `.md` files without giving up on the first unreadable
/// entry.
///
/// When `disable_gitignore` is false, files matched by the root `.gitignore`
/// are skipped. Exclude patterns follow gitignore syntax and are always
/// applied on top. A directory reached a second time through a symlink is
/// walked once; a symlink back into one of its own ancestors is recorded as a
/// failure. Only invalid exclude patterns fail the whole call.
pub fn discover_markdown_files(root: &Path, options: &RefOptions) -> MdrefResult<Discovery> {
	let gitignore = if options.disable_gitignore {
		Gitignore::empty()
	} else {
		build_gitignore(root)
	};
	let custom_exclude = build_exclude_matcher(root, &options.exclude_patterns)?;

	let mut walker = Walker {
		gitignore: &gitignore,
		custom_exclude: &custom_exclude,
		visited_dirs: HashSet::new(),
		ancestors: Vec::new(),
		discovery: Discovery::default(),
	};
	walker.walk(root);

	let mut discovery = walker.discovery;
	discovery.files.sort();
	Ok(discovery)
}

/// Collect every `.md` file below `root`, sorted for deterministic ordering.
///
/// Paths the walk could not read are logged and left out; use
/// [`discover_markdown_files`] to inspect them.
pub fn collect_markdown_files(root: &Path, options: &RefOptions) -> MdrefResult<Vec<PathBuf>> {
	let discovery = discover_markdown_files(root, options)?;

	for (path, error) in &discovery.failures {
		tracing::warn!(path = %path.display(), %error, "skipped during discovery");
	}

	Ok(discovery.files)
}

fn build_exclude_matcher(root: &Path, patterns: &[String]) -> MdrefResult<Gitignore> {
	let mut builder = GitignoreBuilder::new(root);
	for pattern in patterns {
		builder.add_line(None, pattern).map_err(|e| {
			MdrefError::ConfigParse(format!("invalid exclude pattern `{pattern}`: {e}"))
		})?;
	}
	builder
		.build()
		.map_err(|e| MdrefError::ConfigParse(format!("failed to build exclude rules: {e}")))
}

fn build_gitignore(root: &Path) -> Gitignore {
	let mut builder = GitignoreBuilder::new(root);
	let gitignore_path = root.join(".gitignore");
	if gitignore_path.exists() {
		let _ = builder.add(gitignore_path);
	}
	builder.build().unwrap_or_else(|_| Gitignore::empty())
}

fn is_ignored_directory_name(name: &str) -> bool {
	name.starts_with('.') || name == "node_modules" || name == "target"
}

fn is_markdown_file(path: &Path) -> bool {
	path.extension()
		.is_some_and(|extension| extension == MARKDOWN_EXTENSION)
}

struct Walker<'a> {
	gitignore: &'a Gitignore,
	custom_exclude: &'a Gitignore,
	visited_dirs: HashSet<PathBuf>,
	ancestors: Vec<PathBuf>,
	discovery: Discovery,
}

impl Walker<'_> {
	fn walk(&mut self, dir: &Path) {
		let canonical = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());

		if self.ancestors.contains(&canonical) {
			self.fail(
				dir,
				MdrefError::SymlinkCycle {
					path: dir.display().to_string(),
				},
			);
			return;
		}

		if !self.visited_dirs.insert(canonical.clone()) {
			tracing::debug!(path = %dir.display(), "directory already walked through another path");
			return;
		}

		let entries = match std::fs::read_dir(dir) {
			Ok(entries) => entries,
			Err(error) => {
				self.fail(dir, error.into());
				return;
			}
		};

		// A directory shared by several aliases is walked under the first in path order.
		let mut paths = Vec::new();
		for entry in entries {
			match entry {
				Ok(entry) => paths.push(entry.path()),
				Err(error) => self.fail(dir, error.into()),
			}
		}
		paths.sort();

		self.ancestors.push(canonical);
		for path in paths {
			self.visit(path);
		}
		self.ancestors.pop();
	}

	fn visit(&mut self, path: PathBuf) {
		let is_dir = path.is_dir();

		if is_dir
			&& path
				.file_name()
				.and_then(|name| name.to_str())
				.is_some_and(is_ignored_directory_name)
		{
			return;
		}

		if self.gitignore.matched(&path, is_dir).is_ignore()
			|| self.custom_exclude.matched(&path, is_dir).is_ignore()
		{
			return;
		}

		if is_dir {
			self.walk(&path);
		} else if is_markdown_file(&path) {
			self.discovery.files.push(path);
		}
	}

	fn fail(&mut self, path: &Path, error: MdrefError) {
		self.discovery.failures.push((path.to_path_buf(), error));
	}
}
