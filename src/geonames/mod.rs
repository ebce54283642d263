//! GeoNames linkage.

mod matcher;
mod record;

pub use matcher::{distance_km, GeoMatcher, MatchStats};
pub use record::GeonameRecord;
