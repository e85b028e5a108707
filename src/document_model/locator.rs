//! Caret-relative lookups over a buffer. Offsets are char offsets and must
//! already be clamped to `[0, char_count]`.

/// Char range `(start, end)` of the line containing `caret`, newlines excluded.
pub fn line_bounds(text: &str, caret: usize) -> (usize, usize) {
    let chars: Vec<char> = text.chars().collect();
    let caret = caret.min(chars.len());

    let start = chars[..caret]
        .iter()
        .rposition(|&c| c == '\n')
        .map_or(0, |idx| idx + 1);
    let end = chars[caret..]
        .iter()
        .position(|&c| c == '\n')
        .map_or(chars.len(), |idx| caret + idx);

    (start, end)
}

pub fn current_line(text: &str, caret: usize) -> String {
    let (start, end) = line_bounds(text, caret);
    text.chars().skip(start).take(end - start).collect()
}

/// The whitespace-delimited word around the caret. Empty means "no word".
pub fn current_word(text: &str, caret: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    let caret = caret.min(chars.len());

    let left = chars[..caret]
        .iter()
        .rposition(|c| c.is_whitespace())
        .map_or(0, |idx| idx + 1);
    let right = chars[caret..]
        .iter()
        .position(|c| c.is_whitespace())
        .map_or(chars.len(), |idx| caret + idx);

    chars[left..right].iter().collect::<String>().trim().to_string()
}

/// Character just after the caret, if any.
pub fn char_at(text: &str, offset: usize) -> Option<char> {
    text.chars().nth(offset)
}
