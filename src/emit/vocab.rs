//! Predicate and class IRIs used in the output.

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
pub const RDFS_LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
pub const RDFS_SEE_ALSO: &str = "http://www.w3.org/2000/01/rdf-schema#seeAlso";
pub const SKOS_PREF_LABEL: &str = "http://www.w3.org/2004/02/skos/core#prefLabel";
pub const OWL_SAME_AS: &str = "http://www.w3.org/2002/07/owl#sameAs";
pub const WGS84_LAT: &str = "http://www.w3.org/2003/01/geo/wgs84_pos#lat";
pub const WGS84_LONG: &str = "http://www.w3.org/2003/01/geo/wgs84_pos#long";
pub const XSD_DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";

// Local names in the ontology namespace
pub const HAS_PARENT: &str = "hasParent";
pub const HAS_GOVERNMENT_CODE: &str = "hasGovernmentCode";
pub const HAS_STATS_CODE: &str = "hasStatsCode";
