//! One line of a GeoNames dump.

use csv::StringRecord;

use crate::models::GeoPoint;

// Column positions of the tab-separated dump
const ID: usize = 0;
const NAME: usize = 1;
const ASCII_NAME: usize = 2;
const ALTERNATE_NAMES: usize = 3;
const LATITUDE: usize = 4;
const LONGITUDE: usize = 5;
const FEATURE_CLASS: usize = 6;

#[derive(Debug, Clone, PartialEq)]
pub struct GeonameRecord {
    pub id: String,
    pub name: String,
    pub ascii_name: String,
    pub alternate_names: Vec<String>,
    pub location: GeoPoint,
    pub feature_class: String,
}

impl GeonameRecord {
    /// Parse a dump line; `None` if a required column is missing or a
    /// coordinate does not parse.
    pub fn from_record(record: &StringRecord) -> Option<Self> {
        let id = record.get(ID)?.trim();
        if id.is_empty() {
            return None;
        }
        let lat: f64 = record.get(LATITUDE)?.trim().parse().ok()?;
        let lon: f64 = record.get(LONGITUDE)?.trim().parse().ok()?;
        let location = GeoPoint::new(lat, lon);
        if !location.is_valid() {
            return None;
        }

        let alternate_names = record
            .get(ALTERNATE_NAMES)?
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();

        Some(Self {
            id: id.to_string(),
            name: record.get(NAME)?.trim().to_string(),
            ascii_name: record.get(ASCII_NAME)?.trim().to_string(),
            alternate_names,
            location,
            feature_class: record.get(FEATURE_CLASS)?.trim().to_string(),
        })
    }

    /// ASCII name followed by the alternates, blanks dropped.
    pub fn match_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.ascii_name.as_str())
            .chain(self.alternate_names.iter().map(String::as_str))
            .filter(|name| !name.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(cells: &[&str]) -> StringRecord {
        StringRecord::from(cells.to_vec())
    }

    #[test]
    fn test_parses_dump_line() {
        let parsed = GeonameRecord::from_record(&record(&[
            "1627896",
            "Semarang",
            "Semarang",
            "SRG,Samarang, ",
            "-6.9932",
            "110.4203",
            "P",
            "PPLA",
        ]))
        .unwrap();
        assert_eq!(parsed.id, "1627896");
        assert_eq!(parsed.alternate_names, vec!["SRG", "Samarang"]);
        assert_eq!(parsed.feature_class, "P");
        assert_eq!(
            parsed.match_names().collect::<Vec<_>>(),
            vec!["Semarang", "SRG", "Samarang"]
        );
    }

    #[test]
    fn test_rejects_short_or_unparsable_lines() {
        assert!(GeonameRecord::from_record(&record(&["1", "A", "A"])).is_none());
        assert!(GeonameRecord::from_record(&record(&["1", "A", "A", "", "x", "1", "P"])).is_none());
        assert!(GeonameRecord::from_record(&record(&["", "A", "A", "", "1", "1", "P"])).is_none());
        assert!(GeonameRecord::from_record(&record(&["1", "A", "A", "", "95", "1", "P"])).is_none());
    }
}
