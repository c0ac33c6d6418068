//! Register-name table extraction.
//!
//! The public header lists the ABI register names in an X-macro:
//!
//! ```c
//! #define RV_REGS_LIST \
//!     _(zero)          \
//!     _(ra)            \
//!     ...
//!     _(t6)
//! ```
//!
//! The template cannot expand the X-macro, so the names are turned into an
//! ordinal enumeration instead.

use crate::error::TemplategenError;
use crate::source::lexical::{find_token, identifier_at, matching_close, skip_whitespace, starts_token};

/// Number of integer registers the enumeration must describe.
pub const REGISTER_COUNT: usize = 32;

const REGS_MACRO: &str = "#define RV_REGS_LIST";

/// Returns the register names listed in `RV_REGS_LIST`, in order.
///
/// The macro body ends at the first line without a trailing `\`.
///
/// # Errors
///
/// Returns [`TemplategenError::Extraction`] when the macro is absent and
/// [`TemplategenError::MalformedRegisterTable`] unless exactly
/// [`REGISTER_COUNT`] entries are found.
pub fn register_names(artifact: &str, text: &str) -> Result<Vec<String>, TemplategenError> {
    let start = find_token(text, REGS_MACRO, 0)
        .ok_or_else(|| TemplategenError::extraction(artifact, format!("`{REGS_MACRO}`")))?;
    let body = macro_body(text.get(start + REGS_MACRO.len()..).unwrap_or_default());

    let mut names = Vec::new();
    let mut from = 0;
    while let Some(entry) = body.get(from..).and_then(|tail| tail.find("_(")).map(|at| from + at) {
        from = entry + 2;
        if !starts_token(&body, entry) {
            continue;
        }
        let open = entry + 1;
        let Some(close) = matching_close(&body, open, '(', ')') else {
            break;
        };
        if let Some(name) = identifier_at(&body, skip_whitespace(&body, open + 1)) {
            names.push(name.to_owned());
        }
        from = close + 1;
    }

    if names.len() != REGISTER_COUNT {
        return Err(TemplategenError::MalformedRegisterTable {
            artifact: artifact.to_owned(),
            found: names.len(),
        });
    }
    Ok(names)
}

/// Renders the ordinal enumeration for `names`.
#[must_use]
pub fn register_enum(names: &[String]) -> String {
    let mut rendered = String::from("enum {");
    for name in names {
        rendered.push_str("rv_reg_");
        rendered.push_str(name);
        rendered.push(',');
    }
    rendered.push_str("N_RV_REGS };");
    rendered
}

fn macro_body(after_name: &str) -> String {
    let mut body = String::new();
    for line in after_name.split('\n') {
        let trimmed = line.trim_end();
        match trimmed.strip_suffix('\\') {
            Some(continued) => {
                body.push_str(continued);
                body.push('\n');
            }
            None => {
                body.push_str(trimmed);
                break;
            }
        }
    }
    body
}
