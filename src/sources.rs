//! Readers for the three input datasets.
//!
//! Primary and gazetteer rows are streamed lazily; the statistics-agency
//! table is small and read whole. Any failure to open or decode a source is
//! fatal and names the source; a row that decodes but does not fit the
//! expected shape is left to the consuming stage.

use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter};
use flate2::read::GzDecoder;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{InputSource, PipelineError, Result};

/// Open a source file, decompressing it if it ends in `.gz`.
pub fn open_source(input: InputSource, path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path).map_err(|error| PipelineError::Open {
        input,
        path: path.to_path_buf(),
        error,
    })?;
    let reader: Box<dyn Read> = if path.extension().map_or(false, |e| e == "gz") {
        Box::new(GzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    Ok(reader)
}

/// Lazy record stream over one source.
pub struct Rows<R: Read> {
    input: InputSource,
    path: PathBuf,
    records: StringRecordsIntoIter<R>,
}

impl<R: Read> Rows<R> {
    /// Comma-delimited, no header, rows of any width.
    pub fn primary(reader: R, path: &Path) -> Self {
        let records = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader)
            .into_records();
        Self {
            input: InputSource::Primary,
            path: path.to_path_buf(),
            records,
        }
    }

    /// Tab-delimited GeoNames dump. Names may contain quote characters, so
    /// quoting is off.
    pub fn gazetteer(reader: R, path: &Path) -> Self {
        let records = ReaderBuilder::new()
            .has_headers(false)
            .delimiter(b'\t')
            .quoting(false)
            .flexible(true)
            .from_reader(reader)
            .into_records();
        Self {
            input: InputSource::Gazetteer,
            path: path.to_path_buf(),
            records,
        }
    }

    /// Rows as owned cells, for the tree builder.
    pub fn into_cells(self) -> impl Iterator<Item = Result<Vec<String>>> {
        self.map(|row| row.map(|record| record.iter().map(str::to_string).collect()))
    }
}

impl<R: Read> Iterator for Rows<R> {
    type Item = Result<StringRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.records.next()?;
        Some(record.map_err(|error| PipelineError::Read {
            input: self.input,
            path: self.path.clone(),
            error,
        }))
    }
}

pub fn primary_rows(path: &Path) -> Result<Rows<Box<dyn Read>>> {
    let reader = open_source(InputSource::Primary, path)?;
    Ok(Rows::primary(reader, path))
}

pub fn gazetteer_rows(path: &Path) -> Result<Rows<Box<dyn Read>>> {
    let reader = open_source(InputSource::Gazetteer, path)?;
    Ok(Rows::gazetteer(reader, path))
}

/// One row of the statistics-agency table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatsRow {
    /// Stats code as an integer, e.g. 3301
    pub serial: u64,
    pub name: String,
    /// Row id, referenced by `parent_nid`
    pub nid: String,
    #[serde(default)]
    pub parent_nid: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub longitude: Option<f64>,
}

impl StatsRow {
    pub fn code(&self) -> String {
        self.serial.to_string()
    }
}

#[derive(Debug, Default)]
pub struct StatsTable {
    pub rows: Vec<StatsRow>,
    /// Rows that did not decode into a [`StatsRow`]
    pub malformed: usize,
}

impl StatsTable {
    /// Read a headed CSV table. Rows that fail to decode are skipped.
    pub fn from_reader<R: Read>(reader: R, path: &Path) -> Result<Self> {
        let read_error = |error| PipelineError::Read {
            input: InputSource::Secondary,
            path: path.to_path_buf(),
            error,
        };

        let mut csv_reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = csv_reader.headers().map_err(read_error)?.clone();

        let mut table = StatsTable::default();
        for result in csv_reader.records() {
            let record = result.map_err(read_error)?;
            match record.deserialize::<StatsRow>(Some(&headers)) {
                Ok(row) => table.rows.push(row),
                Err(e) => {
                    warn!("Skipping statistics row {:?}: {}", record.position(), e);
                    table.malformed += 1;
                }
            }
        }
        Ok(table)
    }

    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading statistics table from {}", path.display());
        let reader = open_source(InputSource::Secondary, path)?;
        let table = Self::from_reader(reader, path)?;
        info!(
            "Loaded {} statistics rows ({} malformed)",
            table.rows.len(),
            table.malformed
        );
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_primary_rows_are_flexible() {
        let data = "\n,1,33,JAWA TENGAH\n33.01,Kab. Cilacap\n";
        let rows: Vec<Vec<String>> = Rows::primary(data.as_bytes(), Path::new("p.csv"))
            .into_cells()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["", "1", "33", "JAWA TENGAH"]);
        assert_eq!(rows[1], vec!["33.01", "Kab. Cilacap"]);
    }

    #[test]
    fn test_gazetteer_rows_ignore_quotes() {
        let data = "1642911\tJakarta\tJakarta\t\"Big Durian\",DKI\t-6.21\t106.85\tP\n";
        let rows: Vec<StringRecord> = Rows::gazetteer(data.as_bytes(), Path::new("ID.txt"))
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(&rows[0][3], "\"Big Durian\",DKI");
        assert_eq!(&rows[0][6], "P");
    }

    #[test]
    fn test_stats_table_skips_undecodable_rows() {
        let data = "serial,name,nid,parent_nid,latitude,longitude\n\
                    33,Jawa Tengah,n33,,-7.15,110.14\n\
                    x,Broken,n0,,,\n\
                    3301,Cilacap,n3301,n33,,\n";
        let table = StatsTable::from_reader(data.as_bytes(), Path::new("bps.csv")).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.malformed, 1);
        assert_eq!(table.rows[0].latitude, Some(-7.15));
        assert_eq!(table.rows[1].parent_nid.as_deref(), Some("n33"));
        assert_eq!(table.rows[1].latitude, None);
        assert_eq!(table.rows[1].code(), "3301");
    }

    #[test]
    fn test_missing_file_names_source() {
        let err = primary_rows(Path::new("/nonexistent/buku-induk.csv")).err().unwrap();
        assert_eq!(err.input(), Some(InputSource::Primary));
        assert!(matches!(err, PipelineError::Open { .. }));
    }

    #[test]
    fn test_gzip_source_is_decoded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ID.txt.gz");
        let file = File::create(&path).unwrap();
        let mut encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        encoder
            .write_all(b"1627896\tSemarang\tSemarang\t\t-6.99\t110.42\tP\n")
            .unwrap();
        encoder.finish().unwrap();

        let rows: Vec<StringRecord> = gazetteer_rows(&path)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(&rows[0][1], "Semarang");
    }
}
