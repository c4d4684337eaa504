//! Field schema resolution and row splitting.
//!
//! A conversion run works against a fixed, ordered list of field names.
//! The schema is resolved exactly once at run start, either from an
//! explicit list supplied by the caller or from the first non-skipped
//! line of input when header mode is active. Every subsequent row must
//! split into exactly that many columns or it is rejected.

use tracing::warn;

use tabxml_shared::{Result, TabXmlError};

/// The ordered field names governing a conversion run.
///
/// A name may carry a leading `*` marking the field "literal" (its
/// values are emitted without markup escaping). The sentinel is kept
/// here and stripped at emission time.
#[derive(Debug, Clone)]
pub struct FieldSchema {
    fields: Vec<String>,
}

impl FieldSchema {
    /// Build a schema from an explicit field-name list.
    pub fn explicit(fields: Vec<String>) -> Result<Self> {
        if fields.is_empty() {
            return Err(TabXmlError::schema("explicit field list is empty"));
        }
        Ok(Self { fields })
    }

    /// Derive a schema from a header line.
    ///
    /// Column names are taken verbatim; no escaping or case folding is
    /// applied to them.
    pub fn from_header(line: &str, delimiter: &str) -> Self {
        let fields = line.split(delimiter).map(str::to_string).collect();
        Self { fields }
    }

    /// The field names, in column order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Number of columns every data row must have.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Split one data row into columns, validating the column count.
    ///
    /// A mismatch is a non-fatal row-level error: a diagnostic naming
    /// the row number and raw line is logged and `None` is returned so
    /// the caller can discard the row and continue.
    pub fn split_row<'a>(&self, line: &'a str, delimiter: &str, row: usize) -> Option<Vec<&'a str>> {
        let cols: Vec<&str> = line.split(delimiter).collect();
        if cols.len() != self.fields.len() {
            warn!(row, line, "mismatched columns in row");
            return None;
        }
        Some(cols)
    }
}
