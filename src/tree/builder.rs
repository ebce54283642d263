//! Reconstruction of the place tree from the primary row stream.
//!
//! The stream is a depth-first preorder walk of the hierarchy. Each row is
//! classified on its own, then applied against a [`BuildContext`] naming the
//! enclosing province and regency; applying a row yields the context for the
//! next one.

use serde::Serialize;
use tracing::{debug, info, warn};

use super::classify::{classify, code_digits, preprocess, split_twin_names, RowKind};
use super::Gazetteer;
use crate::config::ProvinceSplits;
use crate::error::Result;
use crate::models::{PlaceDraft, PlaceId, PlaceType};
use crate::text::{normalize_name, slugify};

/// Enclosing places carried from one row to the next.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildContext {
    /// Province as declared by the source (before any split)
    pub province: Option<PlaceId>,
    pub regency: Option<PlaceId>,
}

/// What applying one row did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOutcome {
    Created {
        id: PlaceId,
        /// District code not six digits deep
        malformed: bool,
    },
    Skipped,
    /// No enclosing province/regency to attach to
    Orphaned,
    /// Name blank, or nothing left of it after normalization
    Unnamed,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildStats {
    pub rows: usize,
    pub skipped: usize,
    pub orphaned: usize,
    pub unnamed: usize,
    pub malformed_codes: usize,
    pub provinces: usize,
    pub regencies: usize,
    pub districts: usize,
}

/// Apply one classified row to the tree.
pub fn apply_row(
    gazetteer: &mut Gazetteer,
    splits: &ProvinceSplits,
    context: BuildContext,
    row: RowKind,
) -> (BuildContext, RowOutcome) {
    match row {
        RowKind::Skip => (context, RowOutcome::Skipped),

        RowKind::Province { code, name } => {
            if !has_slug(&province_name(&name)) {
                warn!("Province {} has no usable name {:?}, dropping its rows", code, name);
                return (BuildContext::default(), RowOutcome::Unnamed);
            }
            let id = build_province(gazetteer, &code, &name);
            let next = BuildContext {
                province: Some(id),
                regency: None,
            };
            (next, RowOutcome::Created { id, malformed: false })
        }

        RowKind::Regency { code, name } => {
            let Some(province) = context.province else {
                warn!("Regency {} ({}) appears before any province", name, code);
                return (context, RowOutcome::Orphaned);
            };
            if !has_slug(&normalize_name(&name, true)) {
                warn!("Regency {} has no usable name {:?}, dropping its rows", code, name);
                let next = BuildContext {
                    province: Some(province),
                    regency: None,
                };
                return (next, RowOutcome::Unnamed);
            }
            let id = build_regency(gazetteer, splits, province, &code, &name);
            let next = BuildContext {
                province: Some(province),
                regency: Some(id),
            };
            (next, RowOutcome::Created { id, malformed: false })
        }

        RowKind::District { code, name } => {
            let Some(regency) = context.regency else {
                warn!("District {} ({}) appears before any regency", name, code);
                return (context, RowOutcome::Orphaned);
            };
            if !has_slug(&normalize_name(&name, false)) {
                warn!("District {} has no usable name {:?}, skipping it", code, name);
                return (context, RowOutcome::Unnamed);
            }
            let malformed = code_digits(&code) != 6;
            if malformed {
                warn!(
                    "District {} has code {} of unexpected depth, keeping it under {}",
                    name,
                    code,
                    gazetteer.get(regency).full_name
                );
            }
            let id = build_district(gazetteer, regency, &code, &name);
            (context, RowOutcome::Created { id, malformed })
        }
    }
}

/// A name that yields no path segment cannot be placed in the tree.
fn has_slug(name: &str) -> bool {
    !slugify(name).is_empty()
}

/// Province name without a leading "Provinsi"
fn province_name(raw: &str) -> String {
    let name = normalize_name(raw, true);
    match name.strip_prefix("Provinsi ") {
        Some(rest) if !rest.is_empty() => rest.to_string(),
        _ => name,
    }
}

fn province_alt_names(name: &str) -> &'static [&'static str] {
    if name.ends_with("Yogyakarta") {
        &["Daerah Istimewa Yogyakarta", "Daista Yogyakarta", "DIY"]
    } else if name.ends_with("Jakarta") {
        &["Jakarta", "DKI"]
    } else {
        &[]
    }
}

pub fn build_province(gazetteer: &mut Gazetteer, code: &str, raw_name: &str) -> PlaceId {
    let name = province_name(raw_name);

    // A province split may have created it already, without a code.
    if let Some(existing) = gazetteer.find_by_path(&slugify(&name)) {
        if existing.is_province() && existing.government_code.is_none() {
            let id = existing.id;
            gazetteer.adopt_government_code(id, code);
            debug!("Province {} adopts code {}", name, code);
            return id;
        }
    }

    let mut draft = PlaceDraft::new(name, PlaceType::Provinsi);
    draft.government_code = Some(code.to_string());
    for alt in province_alt_names(&draft.name) {
        draft.add_alt_name(*alt);
    }
    gazetteer.insert(draft)
}

/// Regency type from the name prefix, most specific first, plus the name
/// with that prefix removed.
pub fn regency_type(name: &str) -> (PlaceType, &str) {
    const PREFIXES: &[(&str, PlaceType)] = &[
        ("Kabupaten Administrasi ", PlaceType::KabupatenAdministrasi),
        ("Kota Administrasi ", PlaceType::KotaAdministrasi),
        ("Kota ", PlaceType::Kota),
        ("Kabupaten ", PlaceType::Kabupaten),
    ];

    for (prefix, place_type) in PREFIXES {
        if let Some(rest) = name.strip_prefix(prefix) {
            if !rest.is_empty() {
                return (*place_type, rest);
            }
        }
    }
    (PlaceType::Kabupaten, name)
}

pub fn build_regency(
    gazetteer: &mut Gazetteer,
    splits: &ProvinceSplits,
    province: PlaceId,
    code: &str,
    raw_name: &str,
) -> PlaceId {
    let name = normalize_name(raw_name, true);
    let (place_type, nominal) = regency_type(&name);
    let nominal = nominal.to_string();
    let full_name = format!("{} {}", place_type.display_prefix(), nominal);

    let declared = gazetteer.get(province).name.clone();
    let parent = match splits.target(&declared, &full_name) {
        Some(target) => split_province(gazetteer, target),
        None => province,
    };

    let mut draft = PlaceDraft::new(name, place_type);
    draft.add_alt_name(format!("{} {}", place_type.short_prefix(), nominal));
    draft.nominal_name = nominal;
    draft.full_name = full_name;
    draft.government_code = Some(code.to_string());
    draft.parent = Some(parent);
    gazetteer.insert(draft)
}

/// Province a split moves regencies into, created on first use.
fn split_province(gazetteer: &mut Gazetteer, name: &str) -> PlaceId {
    if let Some(existing) = gazetteer.find_by_path(&slugify(name)) {
        if existing.is_province() {
            return existing.id;
        }
    }
    info!("Creating province {} for split-off regencies", name);
    gazetteer.insert(PlaceDraft::new(name.to_string(), PlaceType::Provinsi))
}

pub fn build_district(
    gazetteer: &mut Gazetteer,
    regency: PlaceId,
    code: &str,
    raw_name: &str,
) -> PlaceId {
    let name = normalize_name(raw_name, false);
    let province = &gazetteer.province_of(regency).name;
    let place_type = PlaceType::district_for_province(province);

    let mut draft = PlaceDraft::new(name, place_type);
    draft.twin_names = split_twin_names(&draft.name);
    draft.government_code = Some(code.to_string());
    draft.parent = Some(regency);
    gazetteer.insert(draft)
}

/// Drives [`apply_row`] over a whole primary source.
#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    splits: ProvinceSplits,
}

impl TreeBuilder {
    pub fn new(splits: ProvinceSplits) -> Self {
        Self { splits }
    }

    /// Build the tree from raw rows. Only a read failure aborts.
    pub fn build<I>(&self, rows: I) -> Result<(Gazetteer, BuildStats)>
    where
        I: IntoIterator<Item = Result<Vec<String>>>,
    {
        let mut gazetteer = Gazetteer::new();
        let mut stats = BuildStats::default();
        let mut context = BuildContext::default();

        for row in rows {
            let row = row?;
            stats.rows += 1;

            let kind = classify(&preprocess(&row));
            let (next, outcome) = apply_row(&mut gazetteer, &self.splits, context, kind);
            context = next;

            match outcome {
                RowOutcome::Skipped => stats.skipped += 1,
                RowOutcome::Orphaned => stats.orphaned += 1,
                RowOutcome::Unnamed => stats.unnamed += 1,
                RowOutcome::Created { malformed, .. } => {
                    if malformed {
                        stats.malformed_codes += 1;
                    }
                }
            }
        }

        let [provinces, regencies, districts] = gazetteer.count_by_level();
        stats.provinces = provinces;
        stats.regencies = regencies;
        stats.districts = districts;

        info!(
            "Built {} provinces, {} regencies, {} districts from {} rows ({} skipped, {} orphaned, {} unnamed)",
            provinces,
            regencies,
            districts,
            stats.rows,
            stats.skipped,
            stats.orphaned,
            stats.unnamed
        );
        Ok((gazetteer, stats))
    }
}
