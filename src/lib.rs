//! Wilayah - Indonesian administrative gazetteer linkage
//!
//! Rebuilds the province → regency/city → district tree from the government
//! gazetteer, reconciles it with the statistics-agency codes and coordinates,
//! links it to GeoNames records and emits the result as facts.

pub mod config;
pub mod emit;
pub mod error;
pub mod geonames;
pub mod models;
pub mod pipeline;
pub mod reconcile;
pub mod sources;
pub mod text;
pub mod tree;

pub use config::Config;
pub use error::{InputSource, PipelineError, Result};
pub use models::{AdminLevel, Fact, Place, PlaceId, PlaceType, Term};
pub use pipeline::{Pipeline, RunSummary};
pub use tree::Gazetteer;
