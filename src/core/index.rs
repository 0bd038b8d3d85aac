//! Column to field resolution.

use crate::core::record::Schema;

/// Destination of one input column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldIndex {
    /// The column is ignored.
    Skip,
    /// The column is decoded into the schema field at this position.
    Field(usize),
}

/// Builds the column map for a header row.
///
/// When any field declares a tag, each header is matched exactly against the
/// tags and unmatched columns are skipped. If several fields share a tag the
/// last one wins. Without tags column `i` maps to field `i`; columns past the
/// end of the schema are reported when a row reaches them, not here.
pub fn resolve<T, H: AsRef<str>>(headers: &[H], schema: &Schema<T>) -> Vec<FieldIndex> {
    if !schema.is_tagged() {
        return positional(headers.len());
    }

    headers
        .iter()
        .map(|header| {
            schema
                .fields()
                .iter()
                .rposition(|field| field.tag_name() == Some(header.as_ref()))
                .map_or(FieldIndex::Skip, FieldIndex::Field)
        })
        .collect()
}

/// Identity mapping over `width` columns.
pub fn positional(width: usize) -> Vec<FieldIndex> {
    (0..width).map(FieldIndex::Field).collect()
}
