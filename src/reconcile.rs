//! Cross-reference against the statistics-agency table.
//!
//! Each row is matched by name to places of the same level in the same
//! province. A matched place takes the row's code (the table is treated as
//! the corrected coding); coordinates are recorded by code and copied into
//! the tree only after every row has been seen.

use hashbrown::HashMap;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

use crate::models::{AdminLevel, GeoPoint, PlaceId};
use crate::sources::{StatsRow, StatsTable};
use crate::text::normalize_name;
use crate::tree::{Gazetteer, NameIndex};

/// Longest parent chain followed when resolving a row's province
const MAX_PARENT_HOPS: usize = 8;

/// Serials in the 100..=999 band are not valid codes in the table.
pub fn plausible_serial(serial: u64) -> bool {
    serial > 0 && (serial < 100 || serial > 999)
}

/// Level a stats code denotes, from its magnitude
pub fn level_of_serial(serial: u64) -> AdminLevel {
    match serial {
        0..=99 => AdminLevel::Province,
        100..=9_999 => AdminLevel::Regency,
        _ => AdminLevel::District,
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcileStats {
    pub rows: usize,
    pub filtered: usize,
    pub unmatched: usize,
    /// Rows whose name matched more than one place after the guards
    pub ambiguous: usize,
    pub matched: usize,
    pub rebound: usize,
    pub evicted: usize,
    pub coordinates_recorded: usize,
    pub coordinates_propagated: usize,
}

/// Province names declared by the table, resolved through `parent_nid`.
struct ParentChain<'a> {
    by_nid: HashMap<&'a str, &'a StatsRow>,
}

impl<'a> ParentChain<'a> {
    fn new(rows: &'a [StatsRow]) -> Self {
        let by_nid = rows.iter().map(|row| (row.nid.as_str(), row)).collect();
        Self { by_nid }
    }

    /// Name of the province-level row above (or at) `row`, if the chain
    /// reaches one.
    fn province_of(&self, row: &'a StatsRow) -> Option<&'a str> {
        let mut current = row;
        for _ in 0..MAX_PARENT_HOPS {
            if current.serial < 100 {
                return Some(current.name.as_str());
            }
            let parent = current.parent_nid.as_deref()?;
            current = self.by_nid.get(parent).copied()?;
        }
        None
    }
}

#[derive(Debug, Default)]
pub struct Reconciler {
    coordinates: BTreeMap<String, GeoPoint>,
    stats: ReconcileStats,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Match every row of the table, then propagate coordinates.
    pub fn run(mut self, gazetteer: &mut Gazetteer, table: &StatsTable) -> ReconcileStats {
        let chain = ParentChain::new(&table.rows);
        for row in &table.rows {
            let province = chain.province_of(row);
            self.apply_row(gazetteer, row, province);
        }
        self.finish(gazetteer)
    }

    /// Match one row against the tree. `declared_province` is the province
    /// the table files the row under; `None` disables the province guard.
    pub fn apply_row(
        &mut self,
        gazetteer: &mut Gazetteer,
        row: &StatsRow,
        declared_province: Option<&str>,
    ) {
        self.stats.rows += 1;
        if !plausible_serial(row.serial) {
            self.stats.filtered += 1;
            return;
        }

        let code = row.code();
        if let (Some(lat), Some(lon)) = (row.latitude, row.longitude) {
            let point = GeoPoint::new(lat, lon);
            if point.is_valid() {
                self.coordinates.insert(code.clone(), point);
                self.stats.coordinates_recorded += 1;
            } else {
                warn!("Ignoring out-of-range coordinates for {} ({})", row.name, code);
            }
        }

        let candidates = candidates(gazetteer, row, declared_province);
        let id = match candidates.as_slice() {
            [] => {
                debug!("No place matches {} ({})", row.name, code);
                self.stats.unmatched += 1;
                return;
            }
            [id] => *id,
            many => match exact_name_match(gazetteer, row, many) {
                Some(id) => {
                    debug!(
                        "{} ({}) matches {} places, taking {} by its exact name",
                        row.name,
                        code,
                        many.len(),
                        gazetteer.get(id).path
                    );
                    id
                }
                None => {
                    let paths: Vec<&str> = many
                        .iter()
                        .map(|id| gazetteer.get(*id).path.as_str())
                        .collect();
                    warn!(
                        "Statistics row {} ({}) matches {} places, leaving their codes alone: {}",
                        row.name,
                        code,
                        many.len(),
                        paths.join(", ")
                    );
                    self.stats.ambiguous += 1;
                    return;
                }
            },
        };

        self.stats.matched += 1;
        if gazetteer.get(id).stats_code.as_deref() != Some(code.as_str()) {
            self.stats.rebound += 1;
            if let Some(evicted) = gazetteer.assign_stats_code(id, &code) {
                warn!(
                    "Stats code {} taken from {} for {}",
                    code,
                    gazetteer.get(evicted).path,
                    gazetteer.get(id).path
                );
                self.stats.evicted += 1;
            }
        }
    }

    /// Copy recorded coordinates into whichever place now holds each code.
    pub fn finish(mut self, gazetteer: &mut Gazetteer) -> ReconcileStats {
        self.stats.coordinates_propagated = propagate_coordinates(gazetteer, &self.coordinates);
        info!(
            "Reconciled {} rows: {} matched, {} rebound, {} unmatched, {} ambiguous; located {} places",
            self.stats.rows,
            self.stats.matched,
            self.stats.rebound,
            self.stats.unmatched,
            self.stats.ambiguous,
            self.stats.coordinates_propagated
        );
        self.stats
    }
}

/// Places a row may denote: same name (as written or normalized), same
/// level, same province.
fn candidates(
    gazetteer: &Gazetteer,
    row: &StatsRow,
    declared_province: Option<&str>,
) -> Vec<PlaceId> {
    let level = level_of_serial(row.serial);
    let declared = declared_province.map(NameIndex::key);

    let mut found = BTreeSet::new();
    found.extend(gazetteer.find_by_name(&row.name));
    found.extend(gazetteer.find_by_name(&normalize_name(&row.name, true)));

    found
        .into_iter()
        .filter(|id| gazetteer.get(*id).level() == level)
        .filter(|id| match &declared {
            None => true,
            Some(declared) => {
                let province = gazetteer.province_of(*id);
                let same = province
                    .index_names()
                    .iter()
                    .any(|name| NameIndex::key(name) == *declared);
                if !same {
                    debug!(
                        "{} is in {}, not {}; skipping",
                        gazetteer.get(*id).path,
                        province.name,
                        declared
                    );
                }
                same
            }
        })
        .collect()
}

/// The one candidate whose name or full name is the row's name, when the
/// others only share a nominal, alternate or twin name with it.
fn exact_name_match(
    gazetteer: &Gazetteer,
    row: &StatsRow,
    candidates: &[PlaceId],
) -> Option<PlaceId> {
    let keys = [
        NameIndex::key(&row.name),
        NameIndex::key(&normalize_name(&row.name, true)),
    ];
    let mut exact = candidates.iter().copied().filter(|id| {
        let place = gazetteer.get(*id);
        [&place.name, &place.full_name]
            .iter()
            .any(|name| keys.contains(&NameIndex::key(name)))
    });
    match (exact.next(), exact.next()) {
        (Some(id), None) => Some(id),
        _ => None,
    }
}

/// Set the location of every place whose stats code has a recorded
/// coordinate. Returns the number of places located.
pub fn propagate_coordinates(
    gazetteer: &mut Gazetteer,
    coordinates: &BTreeMap<String, GeoPoint>,
) -> usize {
    let mut located = 0;
    for (code, point) in coordinates {
        if let Some(id) = gazetteer.find_by_stats_code(code) {
            gazetteer.set_location(id, *point);
            located += 1;
        }
    }
    located
}
