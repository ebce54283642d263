//! Core data models for the place hierarchy.

pub mod admin;
pub mod fact;
pub mod place;

pub use admin::{AdminLevel, PlaceType};
pub use fact::{Fact, Term};
pub use place::{GeoPoint, Place, PlaceDraft, PlaceId};
