//! Splices planned injections into the original source text.

use crate::record::InjectionRecord;

/// Insert every record's rendered text at its byte position.
///
/// Text is inserted, never replaced: the byte at each position is preserved
/// and emitted after the insertion. Records must already be in emission
/// order. The line offset is always 0 in the current format because every
/// insertion stays on the line it lands on.
pub fn rewrite(source: &str, records: &[InjectionRecord]) -> (String, u32) {
    let mut out = String::with_capacity(source.len() + records.len() * 32);
    let mut cursor = 0usize;
    for record in records {
        let pos = record.pos as usize;
        debug_assert!(pos >= cursor, "records out of order");
        debug_assert!(pos <= source.len(), "record past end of source");
        out.push_str(&source[cursor..pos]);
        out.push_str(&record.render());
        cursor = pos;
    }
    out.push_str(&source[cursor..]);
    (out, 0)
}
