//! Place tree reconstruction and the arena that holds it.

pub mod builder;
pub mod classify;
pub mod gazetteer;
pub mod index;

pub use builder::{apply_row, BuildContext, BuildStats, RowOutcome, TreeBuilder};
pub use classify::{classify, preprocess, RowKind};
pub use gazetteer::{stats_code_from, Gazetteer};
pub use index::{CodeIndex, NameIndex, PathIndex, Rebind};
