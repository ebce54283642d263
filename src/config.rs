use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::{PipelineError, Result};
use crate::models::AdminLevel;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub sources: SourcesConfig,
    pub output: OutputConfig,
    pub namespaces: Namespaces,
    pub labels: LabelConfig,
    pub matching: MatchingConfig,
    pub province_splits: ProvinceSplits,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SourcesConfig {
    /// Government gazetteer CSV
    pub primary: PathBuf,
    /// Statistics-agency code/coordinate CSV
    pub secondary: Option<PathBuf>,
    /// GeoNames country dump (plain or .gz)
    pub gazetteer: Option<PathBuf>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            primary: PathBuf::from("datasources/buku-induk.csv"),
            secondary: None,
            gazetteer: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OutputConfig {
    pub path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("instances.nt"),
        }
    }
}

/// IRI prefixes of the emitted facts.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Namespaces {
    pub place: String,
    pub ontology: String,
    pub government_code: String,
    pub geonames: String,
}

impl Default for Namespaces {
    fn default() -> Self {
        Self {
            place: "http://benangmerah.net/place/idn/".to_string(),
            ontology: "http://benangmerah.net/ontology/".to_string(),
            government_code: "urn:kode-wilayah-indonesia:".to_string(),
            geonames: "http://sws.geonames.org/".to_string(),
        }
    }
}

impl Namespaces {
    /// Every namespace must parse as an absolute IRI.
    pub fn validate(&self) -> Result<()> {
        let all = [
            ("place", &self.place),
            ("ontology", &self.ontology),
            ("government_code", &self.government_code),
            ("geonames", &self.geonames),
        ];
        for (name, value) in all {
            if Url::parse(value).is_err() {
                return Err(PipelineError::InvalidNamespace {
                    name: name.to_string(),
                    value: value.clone(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LabelConfig {
    /// Language tag for label literals, none for plain literals
    pub language: Option<String>,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            language: Some("id".to_string()),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MatchingConfig {
    pub province_km: f64,
    pub regency_km: f64,
    pub district_km: f64,
    /// GeoNames feature classes considered; empty accepts all
    pub feature_classes: Vec<String>,
    /// Gazetteer records matched per parallel batch
    pub batch_size: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            province_km: 1000.0,
            regency_km: 250.0,
            district_km: 25.0,
            feature_classes: vec!["A".to_string(), "P".to_string()],
            batch_size: 4096,
        }
    }
}

impl MatchingConfig {
    /// Maximum centroid distance accepted for a level, in kilometres
    pub fn threshold_km(&self, level: AdminLevel) -> f64 {
        match level {
            AdminLevel::Province => self.province_km,
            AdminLevel::Regency => self.regency_km,
            AdminLevel::District => self.district_km,
        }
    }

    pub fn accepts_feature_class(&self, class: &str) -> bool {
        self.feature_classes.is_empty() || self.feature_classes.iter().any(|c| c == class)
    }
}

/// Regencies the primary source still files under a province they have
/// since left.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ProvinceSplit {
    /// Province the source lists the regencies under
    pub from: String,
    /// Province the regencies belong to
    pub to: String,
    /// Full regency names, e.g. "Kota Tarakan"
    pub regencies: Vec<String>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(transparent)]
pub struct ProvinceSplits(pub Vec<ProvinceSplit>);

impl Default for ProvinceSplits {
    fn default() -> Self {
        Self(vec![ProvinceSplit {
            from: "Kalimantan Timur".to_string(),
            to: "Kalimantan Utara".to_string(),
            regencies: [
                "Kota Tarakan",
                "Kabupaten Bulungan",
                "Kabupaten Malinau",
                "Kabupaten Nunukan",
                "Kabupaten Tana Tidung",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }])
    }
}

impl ProvinceSplits {
    pub fn none() -> Self {
        Self(Vec::new())
    }

    /// Province a regency really belongs to, if a split moves it
    pub fn target(&self, province: &str, regency_full_name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|split| {
                split.from == province && split.regencies.iter().any(|r| r == regency_full_name)
            })
            .map(|split| split.to.as_str())
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| PipelineError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| PipelineError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        config.namespaces.validate()?;
        Ok(config)
    }
}
