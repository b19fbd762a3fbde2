use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::MdrefError;
use crate::MdrefResult;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = ["mdref.toml", ".mdref.toml", ".config/mdref.toml"];

/// Reference used for stale checks when none is configured.
pub const DEFAULT_HEAD: &str = "master";

/// VCS executable used when none is configured.
pub const DEFAULT_PROGRAM: &str = "git";

/// Everything a processing run needs to know, passed explicitly to each entry
/// point so parallel runs and tests can use independent settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefOptions {
	/// Working directory for VCS commands. `None` uses the current directory.
	pub repository: Option<PathBuf>,
	/// The reference that cited revisions are compared against.
	pub head: String,
	/// Whether to look for changes since each cited revision.
	pub check_stale: bool,
	/// The VCS executable.
	pub program: String,
	/// Gitignore-style patterns skipped during directory discovery.
	pub exclude_patterns: Vec<String>,
	/// When true, `.gitignore` is not consulted during directory discovery.
	pub disable_gitignore: bool,
}

impl Default for RefOptions {
	fn default() -> Self {
		Self {
			repository: None,
			head: DEFAULT_HEAD.to_string(),
			check_stale: true,
			program: DEFAULT_PROGRAM.to_string(),
			exclude_patterns: Vec::new(),
			disable_gitignore: false,
		}
	}
}

impl RefOptions {
	/// Construct [`RefOptions`] from an optional [`MdrefConfig`], falling back
	/// to defaults for anything the config leaves out.
	pub fn from_config(config: Option<&MdrefConfig>) -> Self {
		let defaults = Self::default();
		let Some(config) = config else {
			return defaults;
		};

		Self {
			repository: config.repository.clone(),
			head: config.head.clone().unwrap_or(defaults.head),
			check_stale: config.check_stale.unwrap_or(defaults.check_stale),
			program: config.program.clone().unwrap_or(defaults.program),
			exclude_patterns: config.exclude.patterns.clone(),
			disable_gitignore: config.disable_gitignore,
		}
	}
}

/// Configuration loaded from an `mdref.toml` file.
///
/// ```toml
/// repository = "../service"
/// head = "main"
/// check_stale = true
/// program = "git"
/// disable_gitignore = false
///
/// [exclude]
/// patterns = ["drafts/", "*.generated.md"]
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct MdrefConfig {
	/// Repository used as the working directory for VCS commands.
	#[serde(default)]
	pub repository: Option<PathBuf>,
	/// Reference compared against when checking for stale excerpts.
	#[serde(default)]
	pub head: Option<String>,
	/// Set to `false` to skip stale checks.
	#[serde(default)]
	pub check_stale: Option<bool>,
	/// VCS executable to run instead of `git`.
	#[serde(default)]
	pub program: Option<String>,
	/// Exclusion configuration using gitignore-style patterns.
	#[serde(default)]
	pub exclude: ExcludeConfig,
	/// When true, `.gitignore` files are not used for filtering markdown
	/// discovery in directory mode.
	#[serde(default)]
	pub disable_gitignore: bool,
}

/// Configuration for excluding files and directories from directory mode.
#[derive(Debug, Default, Deserialize)]
pub struct ExcludeConfig {
	/// Gitignore-style patterns relative to the input directory.
	///
	/// Examples: `"drafts/"`, `"*.generated.md"`, `"!keep.md"`.
	#[serde(default)]
	pub patterns: Vec<String>,
}

impl MdrefConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> MdrefResult<Option<MdrefConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		Self::load_file(&config_path).map(Some)
	}

	/// Load the config from an explicit path.
	pub fn load_file(path: &Path) -> MdrefResult<MdrefConfig> {
		let content = std::fs::read_to_string(path)?;
		toml::from_str(&content).map_err(|e| MdrefError::ConfigParse(e.to_string()))
	}
}
