//! Linking places to GeoNames records by name and distance.
//!
//! Names only nominate candidates; the great-circle distance between the
//! record and the place decides. Records are processed in batches: candidate
//! lookup and distances are computed in parallel against the frozen tree,
//! then accepted sequentially in dump order.

use csv::StringRecord;
use geo::{Distance, Haversine};
use indicatif::ProgressBar;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, info};

use super::GeonameRecord;
use crate::config::MatchingConfig;
use crate::error::Result;
use crate::models::{GeoPoint, PlaceId};
use crate::tree::Gazetteer;

/// Great-circle distance in kilometres
pub fn distance_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    Haversine.distance(a.to_point(), b.to_point()) / 1000.0
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MatchStats {
    pub records: usize,
    pub malformed: usize,
    /// Records outside the configured feature classes
    pub filtered: usize,
    pub accepted: usize,
    pub rejected: usize,
    /// Candidates already considered for the same record
    pub repeated: usize,
}

/// A located candidate for one record, with its verdict.
#[derive(Debug, Clone, PartialEq)]
struct Proposal {
    place: PlaceId,
    distance_km: f64,
    within: bool,
}

pub struct GeoMatcher {
    config: MatchingConfig,
    progress: ProgressBar,
}

impl GeoMatcher {
    pub fn new(config: MatchingConfig) -> Self {
        Self {
            config,
            progress: ProgressBar::hidden(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Match a whole dump. Only a read failure aborts.
    pub fn run<I>(&self, gazetteer: &mut Gazetteer, records: I) -> Result<MatchStats>
    where
        I: IntoIterator<Item = Result<StringRecord>>,
    {
        let batch_size = self.config.batch_size.max(1);
        let mut stats = MatchStats::default();
        let mut batch = Vec::with_capacity(batch_size);

        for record in records {
            let record = record?;
            stats.records += 1;
            self.progress.inc(1);

            let Some(parsed) = GeonameRecord::from_record(&record) else {
                stats.malformed += 1;
                continue;
            };
            if !self.config.accepts_feature_class(&parsed.feature_class) {
                stats.filtered += 1;
                continue;
            }

            batch.push(parsed);
            if batch.len() == batch_size {
                self.match_batch(gazetteer, &batch, &mut stats);
                batch.clear();
            }
        }
        if !batch.is_empty() {
            self.match_batch(gazetteer, &batch, &mut stats);
        }

        info!(
            "Matched {} gazetteer records: {} links accepted, {} rejected by distance",
            stats.records, stats.accepted, stats.rejected
        );
        Ok(stats)
    }

    fn match_batch(&self, gazetteer: &mut Gazetteer, batch: &[GeonameRecord], stats: &mut MatchStats) {
        let proposals: Vec<Vec<Proposal>> = {
            let frozen: &Gazetteer = gazetteer;
            batch
                .par_iter()
                .map(|record| self.propose(frozen, record))
                .collect()
        };

        for (record, proposals) in batch.iter().zip(proposals) {
            for proposal in proposals {
                if !gazetteer.consider_geoname(proposal.place, &record.id) {
                    stats.repeated += 1;
                    continue;
                }
                if proposal.within {
                    gazetteer.confirm_geoname(proposal.place, &record.id);
                    stats.accepted += 1;
                } else {
                    debug!(
                        "Rejecting geoname {} for {}: {:.1} km away",
                        record.id,
                        gazetteer.get(proposal.place).path,
                        proposal.distance_km
                    );
                    stats.rejected += 1;
                }
            }
        }
    }

    /// Located places sharing a name with the record, with their distance
    /// verdicts. Reads the tree only.
    fn propose(&self, gazetteer: &Gazetteer, record: &GeonameRecord) -> Vec<Proposal> {
        let candidates: BTreeSet<PlaceId> = record
            .match_names()
            .flat_map(|name| gazetteer.find_by_name(name))
            .collect();

        candidates
            .into_iter()
            .filter_map(|id| {
                let place = gazetteer.get(id);
                let location = place.location?;
                let distance_km = distance_km(&record.location, &location);
                Some(Proposal {
                    place: id,
                    distance_km,
                    within: distance_km <= self.config.threshold_km(place.level()),
                })
            })
            .collect()
    }
}
