use crate::Directive;
use crate::VcsGateway;
use crate::VcsRunner;
use crate::excerpt::select_lines;
use crate::excerpt::strip_indent;

/// First line of every generated block.
pub const BEGIN_MARKER: &str = "<!-- Begin generated code reference. DO NOT EDIT -->";
/// Last line of every generated block.
pub const END_MARKER: &str = "<!-- End generated code reference. -->";
/// Appended inside the block when the referenced file changed since the cited
/// revision.
pub const STALE_WARNING: &str = "> *WARNING* This file has changed since the referenced commit. \
                                 This documentation may be out of date. ";

const CODE_FENCE: &str = "```";

/// Apply the directive's line range to fetched file content and remove the
/// shared indentation of the result.
pub fn extract_excerpt(directive: &Directive, content: &str) -> Vec<String> {
	strip_indent(&select_lines(content, directive.range))
}

/// Render the directive line followed by its generated block.
///
/// Annotation lines end in two spaces so markdown renders each on its own
/// line.
pub fn render_block(directive: &Directive, excerpt: &[String], stale: bool) -> String {
	let mut lines = vec![
		directive.source.clone(),
		BEGIN_MARKER.to_string(),
		format!("{CODE_FENCE}{}", directive.format),
	];
	lines.extend_from_slice(excerpt);
	lines.push(CODE_FENCE.to_string());
	lines.push(format!("> Commit: {}  ", directive.revision));
	lines.push(format!("> File: {}  ", directive.path));
	lines.extend(directive.line_annotation());
	if stale {
		lines.push(STALE_WARNING.to_string());
	}
	lines.push(END_MARKER.to_string());

	let mut output = lines.join("\n");
	output.push('\n');
	output
}

/// Whether the directive's file changed between its revision and `head`.
///
/// Failing to list the changes is only worth a warning: the excerpt is still
/// rendered, just without a stale annotation.
pub fn check_stale<R: VcsRunner>(
	gateway: &mut VcsGateway<R>,
	directive: &Directive,
	head: &str,
) -> bool {
	match gateway.changed_files(&directive.revision, head) {
		Ok(changed) if changed.contains(&directive.path) => {
			tracing::warn!(
				"\"{}\" has changed since {}. This documentation may be out of date.",
				directive.path,
				directive.revision
			);
			true
		}
		Ok(_) => false,
		Err(reason) => {
			tracing::warn!(%reason, "unable to get history of \"{}\"", directive.path);
			false
		}
	}
}
