//! Line and whitespace helpers over UTF-8 source text.
//!
//! All offsets are byte offsets. Offsets past the end of the text are clamped.

/// Offset of the first byte of the line containing `offset`.
pub fn line_start(text: &str, offset: usize) -> usize {
    let offset = offset.min(text.len());
    text[..offset].rfind('\n').map_or(0, |idx| idx + 1)
}

/// Offset of the line terminator (or EOF) of the line containing `offset`.
pub fn line_end(text: &str, offset: usize) -> usize {
    let offset = offset.min(text.len());
    let end = text[offset..]
        .find('\n')
        .map_or(text.len(), |idx| offset + idx);
    if end > 0 && text.as_bytes().get(end - 1) == Some(&b'\r') {
        end - 1
    } else {
        end
    }
}

/// Leading whitespace of the line containing `offset`.
pub fn line_indent(text: &str, offset: usize) -> &str {
    let start = line_start(text, offset);
    let rest = &text[start..];
    let len = rest
        .bytes()
        .take_while(|b| *b == b' ' || *b == b'\t')
        .count();
    &rest[..len]
}

/// `true` when only whitespace precedes `offset` on its line.
pub fn starts_line(text: &str, offset: usize) -> bool {
    let offset = offset.min(text.len());
    text[line_start(text, offset)..offset]
        .bytes()
        .all(|b| b == b' ' || b == b'\t')
}

/// Offset just past the last non-whitespace byte before `offset`.
pub fn skip_whitespace_backward(text: &str, offset: usize) -> usize {
    let offset = offset.min(text.len());
    text[..offset]
        .trim_end_matches(|c: char| c.is_whitespace())
        .len()
}

/// Offset of the first non-whitespace byte at or after `offset`.
pub fn skip_whitespace_forward(text: &str, offset: usize) -> usize {
    let offset = offset.min(text.len());
    let rest = &text[offset..];
    offset + (rest.len() - rest.trim_start_matches(|c: char| c.is_whitespace()).len())
}

/// Detects the line separator used by `text`, defaulting to `\n`.
pub fn line_separator(text: &str) -> &'static str {
    match text.find('\n') {
        Some(idx) if idx > 0 && text.as_bytes()[idx - 1] == b'\r' => "\r\n",
        _ => "\n",
    }
}
