//! Sentence chunking.

const TERMINATORS: [char; 3] = ['.', '!', '?'];

fn is_terminator(c: char) -> bool {
    TERMINATORS.contains(&c)
}

/// Splits `text` into speakable units.
///
/// A unit ends after a run of `.`, `!` or `?` (so `"Wait..."` and `"Really?!"`
/// stay whole) or at the end of the input. Units are trimmed and never
/// empty; content after the last terminator is kept as a final unit.
#[must_use]
pub fn split(text: &str) -> Vec<String> {
    let mut units = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !is_terminator(c) {
            continue;
        }
        let mut end = i + c.len_utf8();
        while let Some(&(j, next)) = chars.peek() {
            if !is_terminator(next) {
                break;
            }
            end = j + next.len_utf8();
            chars.next();
        }
        push_unit(&mut units, &text[start..end]);
        start = end;
    }
    push_unit(&mut units, &text[start..]);

    units
}

fn push_unit(units: &mut Vec<String>, raw: &str) {
    let unit = raw.trim();
    if !unit.is_empty() {
        units.push(unit.to_owned());
    }
}
