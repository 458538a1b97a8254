//! The structured view of a disassembled module.
//!
//! The listing parser builds an [`Assembly`] owning its [`Class`]es, which own their
//! [`Method`]s and [`Parameter`]s. Every scope keeps its own ordered [`Line`] sequence in which
//! nested scopes and instrumentation points appear as typed [`Placeholder`]s; the assembler
//! resolves them bottom-up into the final listing. A model lives for a single weave.

mod assembly;
mod class;
mod line;
mod method;
mod mode;
mod parameter;

pub use assembly::{Assembly, SinkRef, SINK_SIGNATURE};
pub use class::{Class, SequenceVariants};
pub use line::{Line, Placeholder, MARKER_PREFIX};
pub use method::{Local, Method};
pub use mode::LoggingMode;
pub use parameter::Parameter;
