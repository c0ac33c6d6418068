//! Token-level helpers for scanning C source text.
//!
//! These work on byte offsets returned by `str::find` and `char_indices`, so
//! every offset they hand out lies on a character boundary.

/// Returns `true` for characters that may appear inside a C identifier.
#[must_use]
pub const fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Returns `true` when the character before `offset` cannot continue an
/// identifier.
#[must_use]
pub fn starts_token(text: &str, offset: usize) -> bool {
    text.get(..offset)
        .and_then(|head| head.chars().next_back())
        .is_none_or(|prev| !is_ident_char(prev))
}

/// Returns `true` when the character at `offset` cannot continue an
/// identifier.
#[must_use]
pub fn ends_token(text: &str, offset: usize) -> bool {
    text.get(offset..)
        .and_then(|tail| tail.chars().next())
        .is_none_or(|next| !is_ident_char(next))
}

/// Finds the first occurrence of `needle` at or after `from` that starts at
/// an identifier boundary.
///
/// When `needle` itself ends with an identifier character the match must also
/// end at a boundary, so `typedef` does not match inside `typedefs`.
#[must_use]
pub fn find_token(text: &str, needle: &str, from: usize) -> Option<usize> {
    let needs_tail_boundary = needle.chars().next_back().is_some_and(is_ident_char);
    let haystack = text.get(from..)?;
    haystack
        .match_indices(needle)
        .map(|(offset, _)| from + offset)
        .find(|&start| {
            starts_token(text, start)
                && (!needs_tail_boundary || ends_token(text, start + needle.len()))
        })
}

/// Reads the identifier starting at `offset`, if any.
#[must_use]
pub fn identifier_at(text: &str, offset: usize) -> Option<&str> {
    let tail = text.get(offset..)?;
    let len = tail
        .char_indices()
        .find(|(_, ch)| !is_ident_char(*ch))
        .map_or(tail.len(), |(idx, _)| idx);
    tail.get(..len).filter(|ident| !ident.is_empty())
}

/// Returns the offset of the first non-whitespace character at or after
/// `offset`.
#[must_use]
pub fn skip_whitespace(text: &str, offset: usize) -> usize {
    text.get(offset..).map_or(offset, |tail| {
        offset + (tail.len() - tail.trim_start().len())
    })
}

/// Finds the delimiter closing the one opened at `open`.
///
/// `open` must index an `opening` character. String and character literals
/// are skipped so delimiters inside them do not count. Returns `None` when
/// the text ends first.
#[must_use]
pub fn matching_close(text: &str, open: usize, opening: char, closing: char) -> Option<usize> {
    let tail = text.get(open..)?;
    let mut depth = 0_usize;
    let mut literal: Option<char> = None;
    let mut escaped = false;
    for (idx, ch) in tail.char_indices() {
        if let Some(quote) = literal {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == quote {
                literal = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' => literal = Some(ch),
            _ if ch == opening => depth += 1,
            _ if ch == closing => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(open + idx);
                }
            }
            _ => {}
        }
    }
    None
}
