// WHY: Explicit two-state scanner instead of a lookaround regex
// Boundaries: terminal punctuation followed by whitespace, or a blank line

use tracing::debug;

use super::{word_count, BoundaryRules, SentenceUnit};

/// Scanner state between characters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Inside a unit that started at a non-whitespace character
    InSentence,
    /// Consuming separator whitespace before the next unit
    AtBoundary,
}

/// Scan `text` left to right, emitting trimmed non-empty units
pub(crate) fn scan<'a>(text: &'a str, rules: &BoundaryRules) -> Vec<SentenceUnit<'a>> {
    // WHY: index by char position so offsets come out in characters, with byte positions alongside
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut units = Vec::new();
    let mut state = ScanState::AtBoundary;
    let mut unit_start = 0;

    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i].1;

        if state == ScanState::AtBoundary {
            if ch.is_whitespace() {
                i += 1;
                continue;
            }
            unit_start = i;
            state = ScanState::InSentence;
        }

        if rules.is_terminal(ch) && chars.get(i + 1).is_some_and(|&(_, next)| next.is_whitespace()) {
            push_unit(&mut units, text, &chars, unit_start, i + 1);
            state = ScanState::AtBoundary;
            i += 1;
            continue;
        }

        if ch == '\n' {
            if let Some(resume) = blank_line_end(&chars, i) {
                push_unit(&mut units, text, &chars, unit_start, i);
                state = ScanState::AtBoundary;
                i = resume;
                continue;
            }
        }

        i += 1;
    }

    if state == ScanState::InSentence {
        push_unit(&mut units, text, &chars, unit_start, chars.len());
    }

    debug!("Segmented {} characters into {} units", chars.len(), units.len());
    units
}

/// If the line feed at `pos` opens a blank line, return the position just past
/// the second line feed
fn blank_line_end(chars: &[(usize, char)], pos: usize) -> Option<usize> {
    let mut next = pos + 1;
    while next < chars.len() && chars[next].1 != '\n' && chars[next].1.is_whitespace() {
        next += 1;
    }
    (next < chars.len() && chars[next].1 == '\n').then_some(next + 1)
}

/// Trim trailing whitespace from `[start, end)` and push the unit if anything is left
fn push_unit<'a>(
    units: &mut Vec<SentenceUnit<'a>>,
    text: &'a str,
    chars: &[(usize, char)],
    start: usize,
    mut end: usize,
) {
    while end > start && chars[end - 1].1.is_whitespace() {
        end -= 1;
    }
    if end == start {
        return;
    }

    let start_byte = chars[start].0;
    let end_byte = chars.get(end).map_or(text.len(), |&(byte, _)| byte);
    let unit_text = &text[start_byte..end_byte];

    units.push(SentenceUnit {
        index: units.len(),
        text: unit_text,
        start,
        end,
        byte_range: start_byte..end_byte,
        word_count: word_count(unit_text),
    });
}
