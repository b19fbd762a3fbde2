use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde::Serialize;

/// Matches a whole directive line:
/// `<!-- {{format|git|revision|path[:from[:to]]}} -->`.
///
/// The path capture is lazy, so trailing `:from:to` suffixes are peeled off
/// before they can be absorbed into the path. Word, digit and space classes
/// are ASCII only: `notes١` is a path, not `notes` plus a line number.
static DIRECTIVE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r"^[[:space:]]*<!--[[:space:]]*\{\{([[:word:]]+)\|git\|(.*?)\|(.*?):?([[:digit:]]+)?:?([[:digit:]]+)?\}\}[[:space:]]*-->[[:space:]]*$",
	)
	.unwrap_or_else(|e| panic!("invalid directive pattern: {e}"))
});

/// The portion of a file a directive asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineRange {
	/// Every line of the file.
	Whole,
	/// A single 1-indexed line.
	SingleLine(usize),
	/// An inclusive 1-indexed span. `from <= to` is assumed, not validated.
	LineSpan(usize, usize),
	/// An end line without a usable start line (`path::5`). Selects nothing.
	EndOnly(usize),
}

impl LineRange {
	fn from_bounds(from: Option<usize>, to: Option<usize>) -> Self {
		match (from, to) {
			(Some(from), Some(to)) => Self::LineSpan(from, to),
			(Some(line), None) => Self::SingleLine(line),
			(None, Some(to)) => Self::EndOnly(to),
			(None, None) => Self::Whole,
		}
	}

	/// Whether the 1-indexed `line` is part of this range.
	pub fn contains(&self, line: usize) -> bool {
		match *self {
			Self::Whole => true,
			Self::SingleLine(target) => line == target,
			Self::LineSpan(from, to) => line >= from && line <= to,
			Self::EndOnly(_) => false,
		}
	}
}

impl fmt::Display for LineRange {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Whole => write!(f, "all lines"),
			Self::SingleLine(line) => write!(f, "line {line}"),
			Self::LineSpan(from, to) => write!(f, "lines {from} to {to}"),
			Self::EndOnly(to) => write!(f, "no lines (end {to} without a start)"),
		}
	}
}

/// A parsed request for a code excerpt from version control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directive {
	/// Language tag for the fenced code block.
	pub format: String,
	/// Any revision the VCS can resolve (branch, tag, commit).
	pub revision: String,
	/// Repository path, always with forward slashes.
	pub path: String,
	pub range: LineRange,
	/// The directive line exactly as it appeared in the document.
	pub source: String,
}

impl Directive {
	/// The `> Line:` / `> Lines:` annotation for this directive, if it
	/// selected a range.
	pub fn line_annotation(&self) -> Option<String> {
		match self.range {
			LineRange::Whole | LineRange::EndOnly(_) => None,
			LineRange::SingleLine(line) => Some(format!("> Line: {line}  ")),
			LineRange::LineSpan(from, to) => Some(format!("> Lines: {from} to {to}  ")),
		}
	}
}

/// Try to read `line` as a directive. Lines that do not match the grammar
/// return `None` and should be passed through untouched.
pub fn parse_directive(line: &str) -> Option<Directive> {
	let captures = DIRECTIVE_PATTERN.captures(line)?;
	let text = |index: usize| captures.get(index).map_or("", |m| m.as_str());
	let number = |index: usize| {
		captures
			.get(index)
			.and_then(|m| m.as_str().parse::<usize>().ok())
	};

	Some(Directive {
		format: text(1).to_string(),
		revision: text(2).to_string(),
		path: text(3).replace('\\', "/"),
		range: LineRange::from_bounds(number(4), number(5)),
		source: line.to_string(),
	})
}
