//! Tally runtime: a sandboxed evaluator with a live instruction counter.
//!
//! The runtime executes sources produced by the injector. It binds an
//! [`InstructionCounter`] under the reserved counter name so the inserted
//! `incr` calls meter the program as it runs, and can optionally enforce an
//! instruction budget.
//!
//! ```
//! use tally_runtime::Sandbox;
//!
//! let mut sandbox = Sandbox::new();
//! let out = sandbox.run("_instruction_counter.incr(8);1 + 2;").unwrap();
//! assert_eq!(out.as_number(), Some(3.0));
//! assert_eq!(sandbox.instruction_count(), 8);
//! ```

mod counter;
mod env;
mod error;
mod eval;
mod value;

pub use counter::InstructionCounter;
pub use error::{RuntimeError, RuntimeResult};
pub use eval::Sandbox;
pub use value::{FunctionValue, Value};
