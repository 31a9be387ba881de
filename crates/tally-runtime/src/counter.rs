//! The runtime instruction counter.

/// A per-execution instruction counter.
///
/// Created fresh for each contract invocation and discarded afterwards;
/// never shared between executions. From the instrumented code's point of
/// view it is append-only: the only way to change it is `incr` with a
/// non-negative amount.
#[derive(Debug, Default)]
pub struct InstructionCounter {
    count: u64,
}

impl InstructionCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `n` instructions. Negative amounts are ignored silently; they are
    /// never legitimate instrumentation output but must not crash the
    /// contract either. Always returns the truthy sentinel so the call can
    /// sit inside the inline `&&`/`||` wrapper forms without changing the
    /// wrapped expression's result.
    pub fn incr(&mut self, n: i64) -> bool {
        if n >= 0 {
            self.count += n as u64;
        }
        true
    }

    /// The running total.
    pub fn count(&self) -> u64 {
        self.count
    }
}
