// File: src/segment.rs
// Purpose: Split raw template text around the next delimiter pair

/// Template text split around the first delimited segment.
///
/// `left` is the literal text before the opening delimiter, `segment` the text
/// between the delimiters and `right` everything after the closing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub left: &'a str,
    pub segment: &'a str,
    pub right: &'a str,
    /// Whether an opening delimiter was found at all
    pub found: bool,
}

impl<'a> Segment<'a> {
    /// A segment holding only literal text
    fn literal(text: &'a str) -> Self {
        Self {
            left: text,
            segment: "",
            right: "",
            found: false,
        }
    }

    /// True once no further delimited segment can follow
    pub fn is_terminal(&self) -> bool {
        !self.found || self.right.is_empty()
    }
}

/// Split `text` at the first literal occurrence of `delimiter`.
///
/// Returns the text before the delimiter and, if the delimiter was present,
/// the text after it (possibly empty).
pub fn split_once<'a>(text: &'a str, delimiter: &str) -> (&'a str, Option<&'a str>) {
    match text.find(delimiter) {
        Some(pos) => (&text[..pos], Some(&text[pos + delimiter.len()..])),
        None => (text, None),
    }
}

/// Find the next `left_delim ... right_delim` pair in `text`.
///
/// Delimiters are matched as literal substrings, leftmost first. A missing
/// closing delimiter makes the rest of the text the segment.
pub fn next_segment<'a>(text: &'a str, left_delim: &str, right_delim: &str) -> Segment<'a> {
    let (left, rest) = split_once(text, left_delim);
    let Some(rest) = rest else {
        return Segment::literal(left);
    };

    let (segment, right) = split_once(rest, right_delim);
    Segment {
        left,
        segment,
        right: right.unwrap_or(""),
        found: true,
    }
}
