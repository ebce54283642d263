//! Fact emission and serialization.

mod emitter;
mod sink;
pub mod vocab;

pub use emitter::{EmitStats, FactEmitter};
pub use sink::{format_triple, FactSink, NTriplesWriter};
