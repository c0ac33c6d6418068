//! Serialisation of a [`TemplateOutput`] as C preprocessor text.

use super::TemplateOutput;
use crate::transform::{EmissionDirective, OperationGroup};

/// Escapes `text` for use inside a C string literal.
///
/// # Examples
///
/// ```
/// use jit_templategen::template::escape_c_string;
///
/// assert_eq!(escape_c_string(r#"printf("%d\n")"#), r#"printf(\"%d\\n\")"#);
/// ```
#[must_use]
pub fn escape_c_string(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Renders the whole document.
///
/// The prologue becomes a `PROLOGUE` macro of string literals, one per line,
/// each ending in an explicit `\n`. Every group becomes an `RVOP` block of
/// `GEN` and `strcat` calls.
#[must_use]
pub fn render(output: &TemplateOutput) -> String {
    let mut rendered = String::from("#define PROLOGUE \\\n");
    let literals: Vec<String> = output
        .prologue_lines()
        .map(|line| format!("\"{}\\n\"", escape_c_string(line)))
        .collect();
    rendered.push_str(&literals.join("\\\n"));
    rendered.push('\n');

    for group in &output.groups {
        render_group(&mut rendered, group);
    }
    rendered
}

fn render_group(out: &mut String, group: &OperationGroup) {
    out.push_str(&format!("RVOP({}, {{\n", group.mnemonic));
    for directive in &group.directives {
        match directive {
            EmissionDirective::Literal(text) => {
                out.push_str(&format!("strcat(gencode, \"{}\\n\");\n", escape_c_string(text)));
            }
            EmissionDirective::Parameterized { format, args } => {
                out.push_str(&format!("GEN(\"{}\\n\"", escape_c_string(format)));
                for arg in args {
                    out.push_str(", ");
                    out.push_str(&arg.to_string());
                }
                out.push_str(");\n");
            }
        }
    }
    out.push_str("})\n");
}
