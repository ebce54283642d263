//! Stage driver: build, reconcile, match, emit.
//!
//! Each stage needs the indices the previous one finished, so stages run
//! strictly in order on the calling thread. Any source or sink failure
//! aborts the run.

use indicatif::ProgressBar;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::emit::{EmitStats, FactEmitter, FactSink};
use crate::error::Result;
use crate::geonames::{GeoMatcher, MatchStats};
use crate::reconcile::{ReconcileStats, Reconciler};
use crate::sources::{gazetteer_rows, primary_rows, StatsTable};
use crate::tree::{BuildStats, Gazetteer, TreeBuilder};

/// Per-stage counters of one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub build: BuildStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reconcile: Option<ReconcileStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matching: Option<MatchStats>,
    pub emit: EmitStats,
}

pub struct Pipeline {
    config: Config,
    progress: ProgressBar,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            progress: ProgressBar::hidden(),
        }
    }

    /// Progress bar ticked once per gazetteer record
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Read the primary source into a tree.
    pub fn build_tree(&self) -> Result<(Gazetteer, BuildStats)> {
        let path = &self.config.sources.primary;
        info!("Building place tree from {}", path.display());

        let rows = primary_rows(path)?;
        let (gazetteer, stats) =
            TreeBuilder::new(self.config.province_splits.clone()).build(rows.into_cells())?;

        for problem in gazetteer.validate() {
            warn!("Tree check: {}", problem);
        }
        Ok((gazetteer, stats))
    }

    /// Reconcile against the statistics table, if one is configured.
    pub fn reconcile(&self, gazetteer: &mut Gazetteer) -> Result<Option<ReconcileStats>> {
        let Some(path) = &self.config.sources.secondary else {
            info!("No statistics table configured, skipping reconciliation");
            return Ok(None);
        };
        let table = StatsTable::load(path)?;
        Ok(Some(Reconciler::new().run(gazetteer, &table)))
    }

    /// Match against the GeoNames dump, if one is configured.
    pub fn match_geonames(&self, gazetteer: &mut Gazetteer) -> Result<Option<MatchStats>> {
        let Some(path) = &self.config.sources.gazetteer else {
            info!("No geonames dump configured, skipping matching");
            return Ok(None);
        };
        info!("Matching against {}", path.display());

        let matcher =
            GeoMatcher::new(self.config.matching.clone()).with_progress(self.progress.clone());
        let stats = matcher.run(gazetteer, gazetteer_rows(path)?)?;
        self.progress.finish_and_clear();
        Ok(Some(stats))
    }

    pub fn emitter(&self) -> FactEmitter {
        FactEmitter::new(
            self.config.namespaces.clone(),
            self.config.labels.language.clone(),
        )
    }

    /// Run every stage and hand the facts to `sink`.
    pub fn run<S: FactSink + ?Sized>(&self, sink: &mut S) -> Result<RunSummary> {
        self.config.namespaces.validate()?;

        let (mut gazetteer, build) = self.build_tree()?;
        let reconcile = self.reconcile(&mut gazetteer)?;
        let matching = self.match_geonames(&mut gazetteer)?;
        let emit = self.emitter().emit(&gazetteer, sink)?;

        Ok(RunSummary {
            build,
            reconcile,
            matching,
            emit,
        })
    }
}
