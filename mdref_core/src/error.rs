use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum MdrefError {
	#[error(transparent)]
	#[diagnostic(code(mdref::io_error))]
	Io(#[from] std::io::Error),

	#[error("unable to read `{path}` at `{revision}` (line {line}): {reason}")]
	#[diagnostic(
		code(mdref::fetch),
		help("check that the revision exists and that the path is relative to the repository root")
	)]
	Fetch {
		revision: String,
		path: String,
		line: usize,
		reason: String,
	},

	#[error("generated block starting on line {line} has no end marker")]
	#[diagnostic(
		code(mdref::missing_end_marker),
		help("add `<!-- End generated code reference. -->` after the generated block, or remove the begin marker")
	)]
	MissingEndMarker { line: usize },

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(mdref::config_parse),
		help("check that mdref.toml is valid TOML with optional `repository`, `head`, and `[exclude]` entries")
	)]
	ConfigParse(String),

	#[error("no output path provided")]
	#[diagnostic(
		code(mdref::missing_output),
		help("pass an output file or directory after the input, or omit both to read from stdin")
	)]
	MissingOutput,

	#[error("symlink cycle detected at: `{path}`")]
	#[diagnostic(
		code(mdref::symlink_cycle),
		help("remove the circular symlink or exclude this path")
	)]
	SymlinkCycle { path: String },

	#[error("worker for `{path}` did not complete: {reason}")]
	#[diagnostic(code(mdref::worker))]
	Worker { path: String, reason: String },
}

pub type MdrefResult<T> = Result<T, MdrefError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
