//! Text replacements over the byte offsets of an unmodified source file.
//!
//! Visitors never edit text directly. They produce a flat list of
//! [`Replacement`]s that all refer to offsets in the *original* text, and
//! [`apply_replacements`] splices them in from the end of the file towards the
//! start so earlier offsets stay valid.
//!
//! Ordering is by descending `end`, then descending `start`, then ascending
//! `priority`. Replacements at the same point are applied in that order, and
//! each later one lands to the left of the text inserted before it. A higher
//! priority therefore ends up leftmost, which is what a closing bracket that
//! must sit *inside* an unrelated insertion at the same offset needs.

use serde::Serialize;
use tracing::warn;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Replacement {
    pub start: u32,
    pub end: u32,
    pub text: String,
    pub priority: i32,
}

impl Replacement {
    /// Insert `text` at `pos`.
    #[must_use]
    pub fn insert(pos: u32, text: impl Into<String>) -> Self {
        Self::insert_with_priority(pos, text, 0)
    }

    #[must_use]
    pub fn insert_with_priority(pos: u32, text: impl Into<String>, priority: i32) -> Self {
        Self {
            start: pos,
            end: pos,
            text: text.into(),
            priority,
        }
    }

    /// Remove the half-open range `start..end`.
    #[must_use]
    pub fn delete(start: u32, end: u32) -> Self {
        Self::replace(start, end, "")
    }

    #[must_use]
    pub fn replace(start: u32, end: u32, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
            priority: 0,
        }
    }

    #[must_use]
    pub const fn is_insertion(&self) -> bool {
        self.start == self.end
    }
}

/// Apply `replacements` to `source` and return the edited text.
///
/// Offsets are byte offsets into `source`. Ranges that partially overlap an
/// already-applied range are clipped to the unedited prefix, ranges past the end
/// of the text are clamped, and ranges that do not fall on UTF-8 character
/// boundaries are skipped. Each of these is logged.
#[must_use]
pub fn apply_replacements(source: &str, replacements: impl IntoIterator<Item = Replacement>) -> String {
    let mut ordered: Vec<Replacement> = replacements.into_iter().collect();
    if ordered.is_empty() {
        return source.to_string();
    }
    ordered.sort_by(|a, b| {
        b.end
            .cmp(&a.end)
            .then_with(|| b.start.cmp(&a.start))
            .then_with(|| a.priority.cmp(&b.priority))
    });

    let len = source.len();
    // Pieces are collected back to front; `cursor` is the start of the text
    // that has already been emitted.
    let mut pieces: Vec<&str> = Vec::with_capacity(ordered.len() * 2 + 1);
    let mut cursor = len;

    for replacement in &ordered {
        if replacement.start > replacement.end {
            warn!(
                start = replacement.start,
                end = replacement.end,
                "skipping replacement with start after end"
            );
            continue;
        }
        let mut start = (replacement.start as usize).min(len);
        let mut end = (replacement.end as usize).min(len);
        if end > cursor {
            warn!(
                start = replacement.start,
                end = replacement.end,
                cursor,
                "replacement overlaps a previously applied range"
            );
            end = cursor;
            start = start.min(end);
        }
        if !source.is_char_boundary(start) || !source.is_char_boundary(end) {
            warn!(
                start,
                end, "skipping replacement that splits a UTF-8 character"
            );
            continue;
        }
        pieces.push(&source[end..cursor]);
        pieces.push(&replacement.text);
        cursor = start;
    }
    pieces.push(&source[..cursor]);

    let capacity = pieces.iter().map(|piece| piece.len()).sum();
    let mut result = String::with_capacity(capacity);
    for piece in pieces.iter().rev() {
        result.push_str(piece);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_returns_source() {
        assert_eq!(apply_replacements("abc", Vec::new()), "abc");
    }

    #[test]
    fn single_insertion() {
        let out = apply_replacements("function f(a) {}", vec![Replacement::insert(12, ": number")]);
        assert_eq!(out, "function f(a: number) {}");
    }

    #[test]
    fn order_of_the_list_does_not_matter() {
        let edits = vec![
            Replacement::insert(0, "<"),
            Replacement::replace(2, 3, "C"),
            Replacement::insert(5, ">"),
        ];
        let mut reversed = edits.clone();
        reversed.reverse();
        assert_eq!(apply_replacements("abcde", edits), "<abCde>");
        assert_eq!(apply_replacements("abcde", reversed), "<abCde>");
    }

    #[test]
    fn later_insertion_at_same_point_lands_left() {
        let out = apply_replacements(
            "x",
            vec![Replacement::insert(1, "A"), Replacement::insert(1, "B")],
        );
        assert_eq!(out, "xBA");
    }

    #[test]
    fn higher_priority_lands_left_of_lower_priority() {
        let out = apply_replacements(
            "x+5",
            vec![
                Replacement::insert(3, ")"),
                Replacement::insert_with_priority(3, "]", 10),
            ],
        );
        assert_eq!(out, "x+5])");
    }

    #[test]
    fn deletion_and_insertion_at_start() {
        let source = "readonly foo;";
        let out = apply_replacements(
            source,
            vec![Replacement::delete(0, 9), Replacement::insert(0, "/*x*/")],
        );
        assert_eq!(out, "/*x*/foo;");
    }

    #[test]
    fn out_of_range_offsets_are_clamped() {
        assert_eq!(apply_replacements("ab", vec![Replacement::insert(10, "!")]), "ab!");
    }

    #[test]
    fn offsets_inside_a_character_are_skipped() {
        let out = apply_replacements("é", vec![Replacement::insert(1, "x")]);
        assert_eq!(out, "é");
    }

    #[test]
    fn multibyte_text_uses_byte_offsets() {
        let source = "const s = 'ü'; f(a)";
        let pos = u32::try_from(source.find("a)").unwrap() + 1).unwrap();
        let out = apply_replacements(source, vec![Replacement::insert(pos, ": string")]);
        assert_eq!(out, "const s = 'ü'; f(a: string)");
    }
}
