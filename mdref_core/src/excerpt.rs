use crate::LineRange;

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Select the lines of `content` covered by `range`, in their original order
/// and untrimmed. Out-of-bounds ranges select nothing rather than failing.
///
/// A byte-order mark on the first line of the file is removed when that line
/// is selected.
pub fn select_lines(content: &str, range: LineRange) -> Vec<&str> {
	content
		.lines()
		.enumerate()
		.map(|(index, line)| (index + 1, line))
		.filter(|(number, _)| range.contains(*number))
		.map(|(number, line)| {
			if number == 1 {
				line.strip_prefix(BYTE_ORDER_MARK).unwrap_or(line)
			} else {
				line
			}
		})
		.collect()
}

/// The number of leading whitespace characters shared by every line that has
/// visible content.
///
/// Empty and whitespace-only lines never lower the result. When no line has
/// visible content the result is `usize::MAX`, which makes [`strip_indent`]
/// blank every line.
pub fn trim_amount<S: AsRef<str>>(lines: &[S]) -> usize {
	let mut amount = usize::MAX;

	for line in lines {
		for (position, character) in line.as_ref().chars().enumerate() {
			if position >= amount {
				break;
			}

			if !character.is_whitespace() {
				amount = position;
				break;
			}
		}

		if amount == 0 {
			break;
		}
	}

	amount
}

/// Remove the common indentation from `lines`, keeping indentation relative
/// to the least indented line. Lines no longer than the trim amount become
/// empty.
pub fn strip_indent<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
	let amount = trim_amount(lines);

	lines
		.iter()
		.map(|line| {
			let line = line.as_ref();
			match line.char_indices().nth(amount) {
				Some((offset, _)) => line[offset..].to_string(),
				None => String::new(),
			}
		})
		.collect()
}
