//! Arena of places plus the indices kept in step with it.

use std::collections::BTreeSet;
use tracing::{debug, warn};

use super::index::{CodeIndex, NameIndex, PathIndex};
use crate::models::{AdminLevel, GeoPoint, Place, PlaceDraft, PlaceId};
use crate::text::child_path;

/// Stats code derived from a government code: its digits only.
pub fn stats_code_from(government_code: &str) -> String {
    government_code
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect()
}

/// Append-only place arena.
///
/// Places are never removed; after creation only the stats code, the
/// location and the gazetteer links change. The arena order is the creation
/// order and drives emission.
#[derive(Debug, Default)]
pub struct Gazetteer {
    places: Vec<Place>,
    paths: PathIndex,
    names: NameIndex,
    codes: CodeIndex,
}

impl Gazetteer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    /// Places in creation order
    pub fn places(&self) -> &[Place] {
        &self.places
    }

    pub fn get(&self, id: PlaceId) -> &Place {
        &self.places[id.0]
    }

    /// Add a place and register it in every index.
    ///
    /// The path is derived from the parent's path; a colliding path gets a
    /// numeric suffix so paths stay unique.
    pub fn insert(&mut self, draft: PlaceDraft) -> PlaceId {
        let id = PlaceId(self.places.len());
        let parent_path = draft.parent.map(|parent| self.get(parent).path.clone());
        let base = child_path(parent_path.as_deref(), &draft.name);

        let mut path = base.clone();
        let mut suffix = 2;
        while self.paths.contains(&path) {
            path = format!("{}-{}", base, suffix);
            suffix += 1;
        }
        if path != base {
            warn!("Path {} already taken, using {} for {}", base, path, draft.name);
        }

        let stats_code = draft.government_code.as_deref().map(stats_code_from);

        let place = Place {
            id,
            name: draft.name,
            nominal_name: draft.nominal_name,
            full_name: draft.full_name,
            alt_names: draft.alt_names,
            twin_names: draft.twin_names,
            place_type: draft.place_type,
            government_code: draft.government_code,
            stats_code: None,
            location: None,
            equivalent_geonames: Vec::new(),
            candidate_geonames: BTreeSet::new(),
            parent: draft.parent,
            path,
        };

        self.paths.insert(&place.path, id);
        for name in place.index_names() {
            self.names.insert(name, id);
        }
        self.places.push(place);

        if let Some(code) = stats_code.filter(|code| !code.is_empty()) {
            self.assign_stats_code(id, &code);
        }

        id
    }

    /// Give a code-less place (a split-off province) its government code.
    /// Returns false if the place already has one.
    pub fn adopt_government_code(&mut self, id: PlaceId, code: &str) -> bool {
        if self.places[id.0].government_code.is_some() {
            return false;
        }
        self.places[id.0].government_code = Some(code.to_string());
        let stats_code = stats_code_from(code);
        if !stats_code.is_empty() {
            self.assign_stats_code(id, &stats_code);
        }
        true
    }

    pub fn parent(&self, id: PlaceId) -> Option<&Place> {
        self.get(id).parent.map(|parent| self.get(parent))
    }

    /// The level-1 ancestor of a place (the place itself for provinces)
    pub fn province_of(&self, id: PlaceId) -> &Place {
        let mut current = self.get(id);
        while let Some(parent) = current.parent {
            current = self.get(parent);
        }
        current
    }

    pub fn find_by_path(&self, path: &str) -> Option<&Place> {
        self.paths.get(path).map(|id| self.get(id))
    }

    /// Places indexed under a name, case-insensitively, in creation order
    pub fn find_by_name(&self, name: &str) -> Vec<PlaceId> {
        self.names.get(name).collect()
    }

    pub fn find_by_stats_code(&self, code: &str) -> Option<PlaceId> {
        self.codes.get(code)
    }

    /// Bind a stats code to a place, moving it off whatever held it before.
    ///
    /// Returns the place that lost the code, whose own code is cleared.
    pub fn assign_stats_code(&mut self, id: PlaceId, code: &str) -> Option<PlaceId> {
        let previous = self.places[id.0].stats_code.clone();
        if previous.as_deref() == Some(code) {
            return None;
        }

        let outcome = self.codes.rebind(id, previous.as_deref(), code);
        self.places[id.0].stats_code = Some(code.to_string());

        if let Some(evicted) = outcome.evicted {
            debug!(
                "Stats code {} moved from {} to {}",
                code,
                self.get(evicted).path,
                self.get(id).path
            );
            self.places[evicted.0].stats_code = None;
        }
        outcome.evicted
    }

    pub fn set_location(&mut self, id: PlaceId, location: GeoPoint) {
        self.places[id.0].location = Some(location);
    }

    /// Remember that a gazetteer record was considered for a place.
    /// Returns false if it already was.
    pub fn consider_geoname(&mut self, id: PlaceId, geoname_id: &str) -> bool {
        self.places[id.0]
            .candidate_geonames
            .insert(geoname_id.to_string())
    }

    pub fn confirm_geoname(&mut self, id: PlaceId, geoname_id: &str) {
        let place = &mut self.places[id.0];
        if !place.equivalent_geonames.iter().any(|g| g == geoname_id) {
            place.equivalent_geonames.push(geoname_id.to_string());
        }
    }

    pub fn codes(&self) -> &CodeIndex {
        &self.codes
    }

    /// Number of places per level, province first
    pub fn count_by_level(&self) -> [usize; 3] {
        let mut counts = [0; 3];
        for place in &self.places {
            counts[usize::from(place.level().rank() - 1)] += 1;
        }
        counts
    }

    /// Check the structural invariants: unique paths, parent one level up.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let mut seen = hashbrown::HashSet::new();

        for place in &self.places {
            if !seen.insert(place.path.as_str()) {
                problems.push(format!("duplicate path {}", place.path));
            }
            match (place.parent, place.level().parent()) {
                (None, None) => {}
                (Some(parent), Some(expected)) => {
                    let level = self.get(parent).level();
                    if level != expected {
                        problems.push(format!(
                            "{} is {:?} but its parent is {:?}",
                            place.path,
                            place.level(),
                            level
                        ));
                    }
                }
                (None, Some(_)) => problems.push(format!("{} has no parent", place.path)),
                (Some(_), None) => problems.push(format!("province {} has a parent", place.path)),
            }
        }

        for (code, id) in self.codes.iter() {
            if self.get(id).stats_code.as_deref() != Some(code) {
                problems.push(format!("code {} bound to {} which disagrees", code, id));
            }
        }
        problems
    }

    /// Places of one level, in creation order
    pub fn at_level(&self, level: AdminLevel) -> impl Iterator<Item = &Place> {
        self.places.iter().filter(move |place| place.level() == level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlaceType;

    fn draft(name: &str, place_type: PlaceType, code: &str, parent: Option<PlaceId>) -> PlaceDraft {
        let mut draft = PlaceDraft::new(name.to_string(), place_type);
        draft.government_code = Some(code.to_string());
        draft.parent = parent;
        draft
    }

    #[test]
    fn test_insert_registers_all_indices() {
        let mut gaz = Gazetteer::new();
        let jateng = gaz.insert(draft("Jawa Tengah", PlaceType::Provinsi, "33", None));
        let cilacap = gaz.insert(draft("Cilacap", PlaceType::Kabupaten, "33.01", Some(jateng)));

        assert_eq!(gaz.get(cilacap).path, "jawa-tengah/cilacap");
        assert_eq!(gaz.find_by_path("jawa-tengah").map(|p| p.id), Some(jateng));
        assert_eq!(gaz.find_by_name("CILACAP"), vec![cilacap]);
        assert_eq!(gaz.find_by_name("kabupaten cilacap"), vec![cilacap]);
        assert_eq!(gaz.find_by_stats_code("3301"), Some(cilacap));
        assert_eq!(gaz.get(cilacap).stats_code.as_deref(), Some("3301"));
        assert!(gaz.validate().is_empty());
    }

    #[test]
    fn test_colliding_paths_get_suffix() {
        let mut gaz = Gazetteer::new();
        let province = gaz.insert(draft("Bali", PlaceType::Provinsi, "51", None));
        let regency = gaz.insert(draft("Badung", PlaceType::Kabupaten, "51.03", Some(province)));
        let a = gaz.insert(draft("Kuta", PlaceType::Kecamatan, "51.03.01", Some(regency)));
        let b = gaz.insert(draft("KUTA", PlaceType::Kecamatan, "51.03.02", Some(regency)));

        assert_eq!(gaz.get(a).path, "bali/badung/kuta");
        assert_eq!(gaz.get(b).path, "bali/badung/kuta-2");
        assert!(gaz.validate().is_empty());
    }

    #[test]
    fn test_assign_stats_code_evicts_holder() {
        let mut gaz = Gazetteer::new();
        let a = gaz.insert(draft("Aceh", PlaceType::Provinsi, "11", None));
        let b = gaz.insert(draft("Bali", PlaceType::Provinsi, "51", None));

        assert_eq!(gaz.assign_stats_code(b, "11"), Some(a));
        assert_eq!(gaz.get(a).stats_code, None);
        assert_eq!(gaz.find_by_stats_code("11"), Some(b));
        assert_eq!(gaz.find_by_stats_code("51"), None);
        assert!(gaz.validate().is_empty());
    }

    #[test]
    fn test_province_of_walks_to_root() {
        let mut gaz = Gazetteer::new();
        let papua = gaz.insert(draft("Papua Barat", PlaceType::Provinsi, "92", None));
        let regency = gaz.insert(draft("Sorong", PlaceType::Kabupaten, "92.01", Some(papua)));
        let district = gaz.insert(draft("Aimas", PlaceType::Distrik, "92.01.01", Some(regency)));
        assert_eq!(gaz.province_of(district).id, papua);
        assert_eq!(gaz.province_of(papua).id, papua);
        assert_eq!(gaz.count_by_level(), [1, 1, 1]);
    }

    #[test]
    fn test_geoname_candidates_are_recorded_once() {
        let mut gaz = Gazetteer::new();
        let id = gaz.insert(draft("Aceh", PlaceType::Provinsi, "11", None));
        assert!(gaz.consider_geoname(id, "1215638"));
        assert!(!gaz.consider_geoname(id, "1215638"));
        gaz.confirm_geoname(id, "1215638");
        gaz.confirm_geoname(id, "1215638");
        assert_eq!(gaz.get(id).equivalent_geonames, vec!["1215638".to_string()]);
    }
}
