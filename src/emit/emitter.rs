//! Turns the finished tree into facts.

use serde::Serialize;
use tracing::info;

use super::vocab;
use super::FactSink;
use crate::config::Namespaces;
use crate::error::{PipelineError, Result};
use crate::models::{Fact, Place, Term};
use crate::text::child_path;
use crate::tree::Gazetteer;

#[derive(Debug, Clone, Default, Serialize)]
pub struct EmitStats {
    pub places: usize,
    pub facts: usize,
}

/// Read-only walk over the arena in creation order.
#[derive(Debug, Clone)]
pub struct FactEmitter {
    namespaces: Namespaces,
    /// Language tag for labels; `None` or empty gives plain literals
    language: Option<String>,
}

impl FactEmitter {
    pub fn new(namespaces: Namespaces, language: Option<String>) -> Self {
        let language = language.filter(|tag| !tag.is_empty());
        Self {
            namespaces,
            language,
        }
    }

    pub fn place_iri(&self, place: &Place) -> String {
        format!("{}{}", self.namespaces.place, place.path)
    }

    fn ontology(&self, local: &str) -> String {
        format!("{}{}", self.namespaces.ontology, local)
    }

    fn label(&self, value: &str) -> Term {
        Term::tagged(value, self.language.as_deref())
    }

    /// Facts for one place, in their fixed order.
    pub fn facts_for(&self, gazetteer: &Gazetteer, place: &Place) -> Vec<Fact> {
        let subject = self.place_iri(place);
        let mut facts = Vec::new();
        let mut push = |predicate: &str, object: Term| {
            facts.push(Fact::new(subject.clone(), predicate, object));
        };

        push(
            vocab::RDF_TYPE,
            Term::iri(self.ontology(place.place_type.class_name())),
        );
        push(vocab::SKOS_PREF_LABEL, self.label(&place.full_name));
        for label in place.labels() {
            push(vocab::RDFS_LABEL, self.label(label));
        }

        if let Some(parent) = gazetteer.parent(place.id) {
            push(&self.ontology(vocab::HAS_PARENT), Term::iri(self.place_iri(parent)));
        }
        if let Some(code) = &place.government_code {
            push(&self.ontology(vocab::HAS_GOVERNMENT_CODE), Term::literal(code));
        }
        if let Some(code) = &place.stats_code {
            push(&self.ontology(vocab::HAS_STATS_CODE), Term::literal(code));
        }
        if let Some(location) = &place.location {
            push(
                vocab::WGS84_LAT,
                Term::typed(location.lat.to_string(), vocab::XSD_DECIMAL),
            );
            push(
                vocab::WGS84_LONG,
                Term::typed(location.lon.to_string(), vocab::XSD_DECIMAL),
            );
        }
        if let Some(code) = &place.government_code {
            push(
                vocab::OWL_SAME_AS,
                Term::iri(format!("{}{}", self.namespaces.government_code, code)),
            );
        }

        // Each twin half names the same place under the same parent.
        let parent_path = gazetteer.parent(place.id).map(|parent| parent.path.as_str());
        for twin in &place.twin_names {
            let sibling = child_path(parent_path, twin);
            if sibling == place.path {
                continue;
            }
            facts.push(Fact::new(
                format!("{}{}", self.namespaces.place, sibling),
                vocab::OWL_SAME_AS,
                Term::iri(subject.clone()),
            ));
        }

        for geoname in &place.equivalent_geonames {
            facts.push(Fact::new(
                subject.clone(),
                vocab::RDFS_SEE_ALSO,
                Term::iri(format!("{}{}/", self.namespaces.geonames, geoname)),
            ));
        }

        facts
    }

    /// Hand every fact of every place to the sink, then flush it.
    pub fn emit<S: FactSink + ?Sized>(&self, gazetteer: &Gazetteer, sink: &mut S) -> Result<EmitStats> {
        let mut stats = EmitStats::default();
        for place in gazetteer.places() {
            for fact in self.facts_for(gazetteer, place) {
                sink.accept(fact).map_err(PipelineError::Sink)?;
                stats.facts += 1;
            }
            stats.places += 1;
        }
        sink.flush().map_err(PipelineError::Sink)?;

        info!("Emitted {} facts for {} places", stats.facts, stats.places);
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProvinceSplits;
    use crate::models::GeoPoint;
    use crate::tree::TreeBuilder;

    fn tree() -> Gazetteer {
        let rows = [
            vec!["", "63", "Kalimantan Selatan"],
            vec!["63.71", "Kota Banjarmasin"],
            vec!["63.71.01", "Banjarmasin (Banjar)"],
        ]
        .into_iter()
        .map(|r| Ok(r.into_iter().map(String::from).collect()));
        TreeBuilder::new(ProvinceSplits::none()).build(rows).unwrap().0
    }

    fn emitter() -> FactEmitter {
        FactEmitter::new(Namespaces::default(), Some("id".to_string()))
    }

    const PLACE: &str = "http://benangmerah.net/place/idn/";

    #[test]
    fn test_province_fact_order() {
        let mut gaz = tree();
        let id = gaz.places()[0].id;
        gaz.set_location(id, GeoPoint::new(-3.09, 115.28));
        gaz.confirm_geoname(id, "1641897");

        let facts = emitter().facts_for(&gaz, gaz.get(id));
        let predicates: Vec<&str> = facts.iter().map(|f| f.predicate.as_str()).collect();
        assert_eq!(
            predicates,
            vec![
                vocab::RDF_TYPE,
                vocab::SKOS_PREF_LABEL,
                vocab::RDFS_LABEL,
                "http://benangmerah.net/ontology/hasGovernmentCode",
                "http://benangmerah.net/ontology/hasStatsCode",
                vocab::WGS84_LAT,
                vocab::WGS84_LONG,
                vocab::OWL_SAME_AS,
                vocab::RDFS_SEE_ALSO,
            ]
        );
        assert_eq!(facts[0].object, Term::iri("http://benangmerah.net/ontology/Provinsi"));
        assert_eq!(
            facts[1].object,
            Term::tagged("Provinsi Kalimantan Selatan", Some("id"))
        );
        assert_eq!(facts[5].object, Term::typed("-3.09", vocab::XSD_DECIMAL));
        assert_eq!(facts[7].object, Term::iri("urn:kode-wilayah-indonesia:63"));
        assert_eq!(facts[8].object, Term::iri("http://sws.geonames.org/1641897/"));
    }

    #[test]
    fn test_twin_names_yield_sibling_identities() {
        let gaz = tree();
        let district = &gaz.places()[2];
        let facts = emitter().facts_for(&gaz, district);
        let canonical = format!("{}kalimantan-selatan/kota-banjarmasin/banjarmasin-banjar", PLACE);

        let twins: Vec<&Fact> = facts
            .iter()
            .filter(|f| f.predicate == vocab::OWL_SAME_AS && f.object == Term::iri(canonical.clone()))
            .collect();
        assert_eq!(twins.len(), 2);
        assert_eq!(
            twins[0].subject,
            format!("{}kalimantan-selatan/kota-banjarmasin/banjarmasin", PLACE)
        );
        assert_eq!(
            twins[1].subject,
            format!("{}kalimantan-selatan/kota-banjarmasin/banjar", PLACE)
        );
        assert!(facts.iter().any(|f| f.predicate.ends_with("hasParent")
            && f.object == Term::iri(format!("{}kalimantan-selatan/kota-banjarmasin", PLACE))));
    }

    #[test]
    fn test_empty_language_gives_plain_labels() {
        let gaz = tree();
        let emitter = FactEmitter::new(Namespaces::default(), Some(String::new()));
        let facts = emitter.facts_for(&gaz, &gaz.places()[0]);
        assert_eq!(facts[1].object, Term::literal("Provinsi Kalimantan Selatan"));
    }

    #[test]
    fn test_emit_is_deterministic() {
        let gaz = tree();
        let mut first: Vec<Fact> = Vec::new();
        let mut second: Vec<Fact> = Vec::new();
        let stats = emitter().emit(&gaz, &mut first).unwrap();
        emitter().emit(&gaz, &mut second).unwrap();
        assert_eq!(first, second);
        assert_eq!(stats.places, 3);
        assert_eq!(stats.facts, first.len());
    }
}
