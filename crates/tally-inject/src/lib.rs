//! Deterministic instruction-counting injector.
//!
//! Rewrites contract source so that every construct with variable or hidden
//! cost increments a reserved counter binding before it runs, letting the
//! host engine meter execution and abort deterministically on a budget. The
//! transform is a pure function of the source text and the options: same
//! input, byte-identical output.
//!
//! ```
//! use tally_inject::{instrument, InjectOptions};
//!
//! let out = instrument("f();", &InjectOptions::default()).unwrap();
//! assert_eq!(out.traceable_source, "_instruction_counter.incr(8);f();");
//! assert_eq!(out.line_offset, 0);
//! ```

mod cost;
mod guard;
mod planner;
mod record;
mod rewrite;
pub mod walker;

pub use cost::cost_of;

use serde::Serialize;
use sha2::{Digest, Sha256};
use tally_parser::parse_source;
use tally_types::ast::Node;
use tally_types::{Diagnostics, SourceFile};

/// Host-selected transform options.
#[derive(Debug, Clone, Copy, Default)]
pub struct InjectOptions {
    /// Reject any occurrence of the reserved counter name, not only
    /// shadowing declarations.
    pub strict_disallow_usage: bool,
}

/// A successfully instrumented contract.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Instrumented {
    /// The rewritten source, ready for the host engine.
    pub traceable_source: String,
    /// Synthetic leading lines added by the rewrite; always 0 in the
    /// current format, where every insertion is same-line.
    pub line_offset: u32,
}

impl Instrumented {
    /// Hex SHA-256 of the instrumented source, for host-side caching.
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.traceable_source)
    }
}

/// Hex SHA-256 of arbitrary source text.
pub fn fingerprint(source: &str) -> String {
    let digest = Sha256::digest(source.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Parse and instrument `source`.
///
/// Parse errors are returned unchanged; a guard violation aborts before any
/// output is produced.
pub fn instrument(source: &str, options: &InjectOptions) -> Result<Instrumented, Diagnostics> {
    let source_file = SourceFile::new("contract.js", source);
    let parsed = parse_source(&source_file);
    if parsed.errors.has_errors() {
        return Err(parsed.errors);
    }
    let program = match parsed.program {
        Some(program) => program,
        None => return Err(parsed.errors),
    };
    instrument_ast(&program, &source_file, options)
}

/// Instrument an already-parsed program.
pub fn instrument_ast(
    program: &Node,
    source_file: &SourceFile,
    options: &InjectOptions,
) -> Result<Instrumented, Diagnostics> {
    if let Err(error) = guard::check(program, source_file, options.strict_disallow_usage) {
        let mut diagnostics = Diagnostics::empty();
        diagnostics.push_error(error);
        return Err(diagnostics);
    }
    let records = planner::plan(program).into_sorted();
    let (traceable_source, line_offset) = rewrite::rewrite(&source_file.source, &records);
    Ok(Instrumented {
        traceable_source,
        line_offset,
    })
}
