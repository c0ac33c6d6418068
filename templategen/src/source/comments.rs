//! Comment stripping for C source artifacts.

/// Removes `/* */` and `//` comments from `text`.
///
/// String and character literals are copied verbatim, so comment markers
/// inside them survive. Newlines inside block comments are kept, which keeps
/// the line structure of the surrounding declaration intact. A line comment
/// is removed up to, but not including, its newline.
#[must_use]
pub fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' | '\'' => {
                out.push(ch);
                copy_literal(ch, &mut chars, &mut out);
            }
            '/' if chars.peek() == Some(&'/') => {
                while chars.next_if(|next| *next != '\n').is_some() {}
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                skip_block_comment(&mut chars, &mut out);
            }
            _ => out.push(ch),
        }
    }

    out
}

fn copy_literal(
    quote: char,
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    out: &mut String,
) {
    let mut escaped = false;
    for ch in chars.by_ref() {
        out.push(ch);
        if escaped {
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else if ch == quote || ch == '\n' {
            break;
        }
    }
}

fn skip_block_comment(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, out: &mut String) {
    let mut prev_star = false;
    for ch in chars.by_ref() {
        if prev_star && ch == '/' {
            return;
        }
        if ch == '\n' {
            out.push('\n');
        }
        prev_star = ch == '*';
    }
}
