use std::io::BufRead;
use std::io::Lines;
use std::io::Write;

use serde::Serialize;

use crate::MdrefError;
use crate::MdrefResult;
use crate::RefOptions;
use crate::VcsGateway;
use crate::VcsRunner;
use crate::directive::Directive;
use crate::directive::parse_directive;
use crate::render::BEGIN_MARKER;
use crate::render::END_MARKER;
use crate::render::check_stale;
use crate::render::extract_excerpt;
use crate::render::render_block;

/// Line-by-line reader with one line of lookahead that can be handed back.
#[derive(Debug)]
pub struct LineCursor<B> {
	lines: Lines<B>,
	buffered: Option<String>,
	line_number: usize,
}

impl<B: BufRead> LineCursor<B> {
	pub fn new(input: B) -> Self {
		Self {
			lines: input.lines(),
			buffered: None,
			line_number: 0,
		}
	}

	/// Look at the next line without consuming it.
	pub fn peek(&mut self) -> MdrefResult<Option<&str>> {
		if self.buffered.is_none() {
			self.buffered = self.lines.next().transpose()?;
		}

		Ok(self.buffered.as_deref())
	}

	/// Consume and return the next line.
	pub fn next_line(&mut self) -> MdrefResult<Option<String>> {
		let line = match self.buffered.take() {
			Some(line) => Some(line),
			None => self.lines.next().transpose()?,
		};

		if line.is_some() {
			self.line_number += 1;
		}

		Ok(line)
	}

	/// Hand back the line most recently returned by [`Self::next_line`] so the
	/// next read yields it again. Only one line can be pending at a time.
	pub fn rewind(&mut self, line: String) {
		debug_assert!(self.buffered.is_none(), "only one line can be rewound");
		self.buffered = Some(line);
		self.line_number = self.line_number.saturating_sub(1);
	}

	/// 1-indexed number of the most recently consumed line.
	pub fn line_number(&self) -> usize {
		self.line_number
	}
}

/// A reference whose file changed after the cited revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaleReference {
	/// 1-indexed line of the directive in the input document.
	pub line: usize,
	pub revision: String,
	pub path: String,
}

/// What happened while rewriting one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentReport {
	/// Number of directives rendered.
	pub references: usize,
	/// Previously generated blocks that were replaced.
	pub replaced_blocks: usize,
	/// References flagged as out of date.
	pub stale: Vec<StaleReference>,
	/// Number of VCS commands actually executed (cache hits excluded).
	pub vcs_invocations: usize,
}

impl DocumentReport {
	pub fn has_stale(&self) -> bool {
		!self.stale.is_empty()
	}
}

/// The fully buffered output of a rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewrittenDocument {
	pub content: String,
	pub report: DocumentReport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RewriteState {
	Scanning,
	DirectiveJustEmitted,
}

/// Rewrite a markdown document, expanding every directive into a freshly
/// generated block.
///
/// A generated block that directly follows a directive is dropped and
/// regenerated, so feeding the output back in produces the same output.
/// Nothing is returned unless every directive could be rendered.
pub fn rewrite_document<B: BufRead, R: VcsRunner>(
	input: B,
	gateway: &mut VcsGateway<R>,
	options: &RefOptions,
) -> MdrefResult<RewrittenDocument> {
	let mut cursor = LineCursor::new(input);
	let mut content = String::new();
	let mut report = DocumentReport::default();
	let mut state = RewriteState::Scanning;

	loop {
		match state {
			RewriteState::Scanning => {
				let Some(line) = cursor.next_line()? else {
					break;
				};

				let Some(directive) = parse_directive(&line) else {
					content.push_str(&line);
					content.push('\n');
					continue;
				};

				let line_number = cursor.line_number();
				let block =
					render_directive(&directive, line_number, gateway, options, &mut report)?;
				content.push_str(&block);
				state = RewriteState::DirectiveJustEmitted;
			}
			RewriteState::DirectiveJustEmitted => {
				state = RewriteState::Scanning;

				let Some(line) = cursor.next_line()? else {
					break;
				};

				if line == BEGIN_MARKER {
					skip_generated_block(&mut cursor)?;
					report.replaced_blocks += 1;
				} else {
					cursor.rewind(line);
				}
			}
		}
	}

	report.vcs_invocations = gateway.invocations();

	Ok(RewrittenDocument { content, report })
}

fn render_directive<R: VcsRunner>(
	directive: &Directive,
	line: usize,
	gateway: &mut VcsGateway<R>,
	options: &RefOptions,
	report: &mut DocumentReport,
) -> MdrefResult<String> {
	tracing::debug!(
		line,
		revision = %directive.revision,
		path = %directive.path,
		range = %directive.range,
		"expanding reference"
	);

	let fetched = gateway
		.fetch_file_at(&directive.revision, &directive.path)
		.map_err(|reason| {
			MdrefError::Fetch {
				revision: directive.revision.clone(),
				path: directive.path.clone(),
				line,
				reason,
			}
		})?;

	let excerpt = extract_excerpt(directive, &fetched);
	let stale = options.check_stale && check_stale(gateway, directive, &options.head);

	report.references += 1;
	if stale {
		report.stale.push(StaleReference {
			line,
			revision: directive.revision.clone(),
			path: directive.path.clone(),
		});
	}

	Ok(render_block(directive, &excerpt, stale))
}

/// Consume the rest of a generated block whose begin marker was just read,
/// through its end marker.
fn skip_generated_block<B: BufRead>(cursor: &mut LineCursor<B>) -> MdrefResult<()> {
	let begin_line = cursor.line_number();

	while let Some(line) = cursor.next_line()? {
		if line == END_MARKER {
			return Ok(());
		}
	}

	Err(MdrefError::MissingEndMarker { line: begin_line })
}

/// Rewrite one document and write it to the destination produced by
/// `create_output`.
///
/// The destination is only created once the whole document has been
/// rewritten, so a failed document never leaves partial output behind.
pub fn process_file<B, R, W, F>(
	input: B,
	gateway: &mut VcsGateway<R>,
	options: &RefOptions,
	create_output: F,
) -> MdrefResult<DocumentReport>
where
	B: BufRead,
	R: VcsRunner,
	W: Write,
	F: FnOnce() -> std::io::Result<W>,
{
	let document = rewrite_document(input, gateway, options)?;
	let mut destination = create_output()?;
	destination.write_all(document.content.as_bytes())?;
	destination.flush()?;

	Ok(document.report)
}
