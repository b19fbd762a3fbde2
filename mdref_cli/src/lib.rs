use std::path::Path;
use std::path::PathBuf;

use clap::Parser;
use mdref_core::MdrefConfig;
use mdref_core::MdrefResult;
use mdref_core::RefOptions;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Embed versioned code excerpts from git history into markdown.",
	long_about = "mdref expands reference comments in markdown into code blocks read from git \
	              history, and warns when the referenced file has changed since the cited \
	              revision.\n\nA reference looks like:\n  <!-- {{rust|git|v1.2.0|src/lib.rs:10:24}} \
	              -->\n\nModes:\n  mdref                  Read stdin, write stdout\n  mdref IN.md \
	              OUT.md    Process one file\n  mdref DOCS/ OUT/       Process every .md file \
	              under DOCS/ in parallel"
)]
#[allow(clippy::struct_excessive_bools)]
pub struct MdrefCli {
	/// Markdown file or directory to process. Reads stdin when omitted.
	pub input: Option<PathBuf>,

	/// Destination file or directory. Required when an input is given. May be
	/// the same as the input to rewrite in place.
	pub output: Option<PathBuf>,

	/// Repository to run git in. Defaults to the current directory.
	#[arg(long, short)]
	pub repo: Option<PathBuf>,

	/// Reference that cited revisions are compared against when checking for
	/// stale excerpts. Defaults to `master`.
	#[arg(long)]
	pub head: Option<String>,

	/// Skip checking whether referenced files changed since their revision.
	#[arg(long, default_value_t = false)]
	pub no_check: bool,

	/// Explicit config file. Without it `mdref.toml`, `.mdref.toml` and
	/// `.config/mdref.toml` are looked up in the current directory.
	#[arg(long, short)]
	pub config: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, default_value_t = false, conflicts_with = "quiet")]
	pub verbose: bool,

	/// Only print warnings and errors.
	#[arg(long, short, default_value_t = false)]
	pub quiet: bool,

	/// Disable colored output.
	#[arg(long, default_value_t = false)]
	pub no_color: bool,
}

impl MdrefCli {
	/// Load the config file (explicit or discovered from `cwd`) and layer the
	/// command line flags over it.
	pub fn resolve_options(&self, cwd: &Path) -> MdrefResult<RefOptions> {
		let config = match &self.config {
			Some(path) => Some(MdrefConfig::load_file(path)?),
			None => MdrefConfig::load(cwd)?,
		};

		Ok(self.apply_flags(RefOptions::from_config(config.as_ref())))
	}

	/// Override `options` with whatever was passed on the command line.
	pub fn apply_flags(&self, mut options: RefOptions) -> RefOptions {
		if let Some(repo) = &self.repo {
			options.repository = Some(repo.clone());
		}

		if let Some(head) = &self.head {
			options.head.clone_from(head);
		}

		if self.no_check {
			options.check_stale = false;
		}

		options
	}

	/// Default `tracing` filter when `RUST_LOG` is unset.
	pub fn log_filter(&self) -> &'static str {
		if self.verbose {
			"mdref=debug,mdref_core=debug"
		} else if self.quiet {
			"mdref=warn,mdref_core=warn"
		} else {
			"mdref=info,mdref_core=info"
		}
	}
}
