//! Position-keyed accumulation of planned injections.
//!
//! Cost contributions landing at the same byte offset with the same
//! generator merge into one record whose value is the running sum, so two
//! expressions billed to the same statement produce a single increment call.
//! Paired generators (a block or wrapper that opens at one offset and closes
//! at another) carry the opening offset on the closing record, which keeps
//! two wrappers that happen to end on the same byte from collapsing into one.

use std::collections::HashMap;

use tally_types::COUNTER_NAME;

/// How an accumulated value is rendered into inserted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeneratorKind {
    /// `_instruction_counter.incr(N);`
    Incr,
    /// `{` plus an increment when the value is non-zero.
    BlockOpen,
    /// An increment when the value is non-zero, plus `}`.
    BlockClose,
    /// `_instruction_counter.incr(N)&&(`
    InlineAnd,
    /// `!_instruction_counter.incr(N)||(`
    InlineOr,
    /// `)`
    CloseParen,
    /// `{`, an increment when non-zero, then `return `.
    ReturnOpen,
    /// `;}`
    ReturnClose,
}

impl GeneratorKind {
    /// Closing halves of a paired generator.
    pub fn is_closing(&self) -> bool {
        matches!(
            self,
            GeneratorKind::BlockClose | GeneratorKind::CloseParen | GeneratorKind::ReturnClose
        )
    }
}

/// One planned insertion: all cost that accumulated at `pos` under one
/// generator.
#[derive(Debug, Clone)]
pub struct InjectionRecord {
    pub pos: u32,
    pub kind: GeneratorKind,
    /// Opening offset of the pair for closing kinds, `pos` itself otherwise.
    pub pair: u32,
    pub value: u64,
    seq: u64,
}

impl InjectionRecord {
    /// Render this record's inserted text.
    pub fn render(&self) -> String {
        let incr = |v: u64| {
            if v > 0 {
                format!("{COUNTER_NAME}.incr({v});")
            } else {
                String::new()
            }
        };
        match self.kind {
            GeneratorKind::Incr => incr(self.value),
            GeneratorKind::BlockOpen => format!("{{{}", incr(self.value)),
            GeneratorKind::BlockClose => format!("{}}}", incr(self.value)),
            GeneratorKind::InlineAnd => format!("{COUNTER_NAME}.incr({})&&(", self.value),
            GeneratorKind::InlineOr => format!("!{COUNTER_NAME}.incr({})||(", self.value),
            GeneratorKind::CloseParen => ")".to_string(),
            GeneratorKind::ReturnOpen => format!("{{{}return ", incr(self.value)),
            GeneratorKind::ReturnClose => ";}".to_string(),
        }
    }
}

/// The accumulator: `(position, generator, pair)` → record.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: Vec<InjectionRecord>,
    index: HashMap<(u32, GeneratorKind, u32), usize>,
    next_seq: u64,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `value` at `pos` under a non-paired (or opening) generator,
    /// creating the record on first use.
    pub fn record(&mut self, pos: u32, kind: GeneratorKind, value: u64) {
        self.upsert(pos, kind, pos, value);
    }

    /// Add `value` to the closing half of a pair that opened at `open_pos`.
    pub fn record_close(&mut self, pos: u32, kind: GeneratorKind, open_pos: u32, value: u64) {
        debug_assert!(kind.is_closing());
        self.upsert(pos, kind, open_pos, value);
    }

    fn upsert(&mut self, pos: u32, kind: GeneratorKind, pair: u32, value: u64) {
        let key = (pos, kind, pair);
        match self.index.get(&key) {
            Some(&i) => self.records[i].value += value,
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                self.index.insert(key, self.records.len());
                self.records.push(InjectionRecord {
                    pos,
                    kind,
                    pair,
                    value,
                    seq,
                });
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Records in emission order: ascending position; at equal positions,
    /// closing records first in reverse registration order (innermost pair
    /// closes first), then the rest in registration order (a block opened
    /// here precedes the increment of the statement it contains).
    pub fn into_sorted(mut self) -> Vec<InjectionRecord> {
        self.records.sort_by_key(|r| {
            let (group, order) = if r.kind.is_closing() {
                (0u8, u64::MAX - r.seq)
            } else {
                (1u8, r.seq)
            };
            (r.pos, group, order)
        });
        self.records
    }
}
