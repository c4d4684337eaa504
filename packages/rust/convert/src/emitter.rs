//! Markup emission for parsed rows.
//!
//! Renders an accepted row as a sequence of `<name>value</name>`
//! elements, optionally wrapped in a per-record tag. Value handling
//! order is deliberate and matches the original tool: case folding,
//! then escaping (or the literal bypass), then whitespace trimming.
//! Trimming last means escaped entities at the value edges survive;
//! downstream consumers depend on that.

use tabxml_shared::{PLACEHOLDER, escape_markup};

/// Per-row rendering settings, fixed for the duration of a run.
#[derive(Debug, Clone, Default)]
pub struct RowFormat {
    /// Opening form of the per-record tag (e.g. `<Rec>`), if configured.
    pub rec_open: Option<String>,
    /// Closing form of the per-record tag (e.g. `</Rec>`), if configured.
    pub rec_close: Option<String>,
    /// Lowercase values before emission.
    pub lower: bool,
    /// Uppercase values before emission (applied after lowercase, so it
    /// wins when both are set).
    pub upper: bool,
    /// Indent record tags by 2 spaces and field elements by 4.
    pub indent: bool,
    /// Drop a field entirely when its trimmed value is the placeholder.
    pub omit_placeholder: bool,
}

impl RowFormat {
    /// Precompute open/close text for an optional wrapper tag name.
    /// An empty or `-` name disables the wrapper.
    pub fn wrap_tag(name: Option<&str>) -> (Option<String>, Option<String>) {
        match name {
            Some(tag) if !tag.is_empty() && tag != "-" => {
                (Some(format!("<{tag}>")), Some(format!("</{tag}>")))
            }
            _ => (None, None),
        }
    }
}

/// Render one row into the output buffer.
///
/// `fields` and `cols` have the same length: the caller has already
/// validated the column count against the schema.
pub fn render_row(out: &mut String, fields: &[String], cols: &[&str], fmt: &RowFormat) {
    if let Some(open) = &fmt.rec_open {
        if fmt.indent {
            out.push_str("  ");
        }
        out.push_str(open);
        out.push('\n');
    }

    for (field, col) in fields.iter().zip(cols) {
        let mut val = (*col).to_string();
        if fmt.lower {
            val = val.to_lowercase();
        }
        if fmt.upper {
            val = val.to_uppercase();
        }

        // Leading '*' marks a literal field: strip the sentinel and
        // skip escaping for its value.
        let (name, val) = match field.strip_prefix('*') {
            Some(name) => (name, val),
            None => (field.as_str(), escape_markup(&val)),
        };

        let val = val.trim();

        if fmt.omit_placeholder && val == PLACEHOLDER {
            continue;
        }

        if fmt.indent {
            out.push_str("    ");
        }
        out.push('<');
        out.push_str(name);
        out.push('>');
        out.push_str(val);
        out.push_str("</");
        out.push_str(name);
        out.push_str(">\n");
    }

    if let Some(close) = &fmt.rec_close {
        if fmt.indent {
            out.push_str("  ");
        }
        out.push_str(close);
        out.push('\n');
    }
}
