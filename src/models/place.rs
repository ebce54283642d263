//! Place node of the administrative tree.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{AdminLevel, PlaceType};

/// Stable arena index of a place; also its creation rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlaceId(pub usize);

impl std::fmt::Display for PlaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Geographic point (lat/lon)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Both coordinates finite and inside WGS84 bounds
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    pub fn to_point(&self) -> geo::Point<f64> {
        geo::Point::new(self.lon, self.lat)
    }
}

/// A province, regency/city or district.
///
/// Owned by the [`Gazetteer`](crate::tree::Gazetteer) arena; `parent` is an arena
/// index, never a live reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Place {
    pub id: PlaceId,

    /// Canonical display name (post-normalization)
    pub name: String,

    /// Name without the administrative-type prefix
    pub nominal_name: String,

    /// Type + name, the preferred label
    pub full_name: String,

    /// Alternate labels in insertion order, no duplicates
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub alt_names: Vec<String>,

    /// Co-equal local names of a district written as "X (Y)" or "X/Y"
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub twin_names: Vec<String>,

    pub place_type: PlaceType,

    /// Primary-source code, e.g. "33.01"; absent only for split-off provinces
    #[serde(skip_serializing_if = "Option::is_none")]
    pub government_code: Option<String>,

    /// Statistics-agency code, digits only; may be rebound by the reconciler
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,

    /// Gazetteer ids that passed the distance test, in match order
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub equivalent_geonames: Vec<String>,

    /// Gazetteer ids already considered for this place
    #[serde(skip_serializing_if = "BTreeSet::is_empty", default)]
    pub candidate_geonames: BTreeSet<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<PlaceId>,

    /// slug(parent.path) + "/" + slug(name), unique across the tree
    pub path: String,
}

impl Place {
    pub fn level(&self) -> AdminLevel {
        self.place_type.level()
    }

    pub fn is_province(&self) -> bool {
        self.level() == AdminLevel::Province
    }

    /// Deduplicated union of name, nominal name, alt names and twin names.
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = Vec::new();
        let all = std::iter::once(self.name.as_str())
            .chain(std::iter::once(self.nominal_name.as_str()))
            .chain(self.alt_names.iter().map(String::as_str))
            .chain(self.twin_names.iter().map(String::as_str));
        for label in all {
            if !label.is_empty() && !labels.contains(&label) {
                labels.push(label);
            }
        }
        labels
    }

    /// Every name the place is reachable by in the name index.
    pub fn index_names(&self) -> Vec<&str> {
        let mut names = self.labels();
        if !names.contains(&self.full_name.as_str()) {
            names.push(self.full_name.as_str());
        }
        names
    }
}

/// Fields of a place before it is assigned an id and a path.
#[derive(Debug, Clone)]
pub struct PlaceDraft {
    pub name: String,
    pub nominal_name: String,
    pub full_name: String,
    pub alt_names: Vec<String>,
    pub twin_names: Vec<String>,
    pub place_type: PlaceType,
    pub government_code: Option<String>,
    pub parent: Option<PlaceId>,
}

impl PlaceDraft {
    pub fn new(name: String, place_type: PlaceType) -> Self {
        Self {
            nominal_name: name.clone(),
            full_name: format!("{} {}", place_type.display_prefix(), name),
            name,
            alt_names: Vec::new(),
            twin_names: Vec::new(),
            place_type,
            government_code: None,
            parent: None,
        }
    }

    /// Add an alternate name, ignoring duplicates
    pub fn add_alt_name(&mut self, alt: impl Into<String>) {
        let alt = alt.into();
        if !alt.is_empty() && !self.alt_names.contains(&alt) {
            self.alt_names.push(alt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place() -> Place {
        Place {
            id: PlaceId(0),
            name: "Kabupaten Cilacap".into(),
            nominal_name: "Cilacap".into(),
            full_name: "Kabupaten Cilacap".into(),
            alt_names: vec!["Kab. Cilacap".into(), "Cilacap".into()],
            twin_names: vec![],
            place_type: PlaceType::Kabupaten,
            government_code: Some("33.01".into()),
            stats_code: Some("3301".into()),
            location: None,
            equivalent_geonames: vec![],
            candidate_geonames: BTreeSet::new(),
            parent: Some(PlaceId(1)),
            path: "jawa-tengah/kabupaten-cilacap".into(),
        }
    }

    #[test]
    fn test_labels_are_deduplicated_in_order() {
        assert_eq!(
            place().labels(),
            vec!["Kabupaten Cilacap", "Cilacap", "Kab. Cilacap"]
        );
    }

    #[test]
    fn test_draft_full_name_uses_type_prefix() {
        let draft = PlaceDraft::new("Jawa Tengah".into(), PlaceType::Provinsi);
        assert_eq!(draft.full_name, "Provinsi Jawa Tengah");
        assert_eq!(draft.nominal_name, "Jawa Tengah");
    }

    #[test]
    fn test_geo_point_validity() {
        assert!(GeoPoint::new(-6.2, 106.8).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 106.8).is_valid());
        assert!(!GeoPoint::new(91.0, 0.0).is_valid());
    }
}
