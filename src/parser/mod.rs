//! Tolerant parser for the text tables plugins print
//!
//! Plugin output is a banner, a header line, then whitespace separated rows.
//! Artifacts pulled from damaged images are often cut short, so a read error
//! ends the scan with a warning and keeps every row mapped so far. Bytes that
//! are not valid UTF-8 are replaced and the row is kept.

mod header;

pub use header::{ArtifactKind, HeaderMarkers};

use crate::core::types::VolaResult;
use std::io::BufRead;
use tracing::{debug, warn};

/// Rows with fewer fields than this are ignored
pub const MIN_FIELDS: usize = 3;

/// What a single parse saw
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseSummary {
    pub header_found: bool,
    /// Rows handed to the mapper
    pub rows: usize,
    /// Rows dropped for having too few fields
    pub skipped: usize,
    /// Reading stopped on an I/O error
    pub truncated: bool,
}

/// Line scanner for one kind of plugin table
#[derive(Debug, Clone)]
pub struct TableParser {
    label: String,
    markers: HeaderMarkers,
    min_fields: usize,
}

impl TableParser {
    pub fn new(label: impl Into<String>, markers: HeaderMarkers) -> Self {
        TableParser {
            label: label.into(),
            markers,
            min_fields: MIN_FIELDS,
        }
    }

    pub fn for_artifact(kind: ArtifactKind) -> Self {
        TableParser::new(kind.name(), kind.markers())
    }

    /// Feeds every data row of `reader` to `on_row`
    ///
    /// An error from `on_row` aborts the parse and is returned as is.
    pub fn parse<R, F>(&self, reader: R, mut on_row: F) -> VolaResult<ParseSummary>
    where
        R: BufRead,
        F: FnMut(&[&str]) -> VolaResult<()>,
    {
        let mut summary = ParseSummary::default();

        for line in reader.split(b'\n') {
            let bytes = match line {
                Ok(bytes) => bytes,
                Err(err) => {
                    warn!(
                        artifact = %self.label,
                        rows = summary.rows,
                        error = %err,
                        "Artifact read stopped early"
                    );
                    summary.truncated = true;
                    break;
                }
            };
            // The tool prints paths in the host code page, not always UTF-8
            let line = String::from_utf8_lossy(&bytes);
            let line = line.trim_end_matches('\r');

            if line.trim().is_empty() {
                continue;
            }
            if !summary.header_found {
                summary.header_found = self.markers.matches(line);
                continue;
            }

            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < self.min_fields {
                summary.skipped += 1;
                continue;
            }

            on_row(&fields)?;
            summary.rows += 1;
        }

        if !summary.header_found {
            warn!(
                artifact = %self.label,
                markers = ?self.markers.markers(),
                "No header line found, artifact yielded no rows"
            );
        }
        debug!(
            artifact = %self.label,
            header_found = summary.header_found,
            rows = summary.rows,
            skipped = summary.skipped,
            "Parsed artifact"
        );
        Ok(summary)
    }

    /// Maps every data row into a record and returns them in input order
    pub fn collect<R, T, F>(&self, reader: R, mut map: F) -> VolaResult<Vec<T>>
    where
        R: BufRead,
        F: FnMut(&[&str]) -> VolaResult<T>,
    {
        let mut records = Vec::new();
        self.parse(reader, |fields| {
            records.push(map(fields)?);
            Ok(())
        })?;
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::VolaError;
    use std::io::{self, BufReader, Cursor, Read};

    const FILESCAN: &str = "Volatility 3 Framework 2.5.0\n\
        \n\
        Offset\tName\tSize\n\
        \n\
        0xe0001\t\\Windows\\System32\\ntdll.dll\t216\n\
        0xe0002 short\n\
        0xe0003\t\\Users\\a\\notes.txt\t216\n";

    fn rows(input: &str) -> (Vec<Vec<String>>, ParseSummary) {
        let parser = TableParser::for_artifact(ArtifactKind::FileScan);
        let mut rows = Vec::new();
        let summary = parser
            .parse(Cursor::new(input), |fields| {
                rows.push(fields.iter().map(|f| f.to_string()).collect());
                Ok(())
            })
            .unwrap();
        (rows, summary)
    }

    #[test]
    fn test_rows_after_header() {
        let (rows, summary) = rows(FILESCAN);
        assert!(summary.header_found);
        assert_eq!(summary.rows, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(rows[0], vec!["0xe0001", "\\Windows\\System32\\ntdll.dll", "216"]);
        assert_eq!(rows[1][0], "0xe0003");
    }

    #[test]
    fn test_no_header_yields_nothing() {
        let (rows, summary) = rows("0xe0001 a 1\n0xe0002 b 2\n");
        assert!(!summary.header_found);
        assert!(rows.is_empty());
    }

    #[test]
    fn test_mapper_error_aborts() {
        let parser = TableParser::for_artifact(ArtifactKind::FileScan);
        let result = parser.parse(Cursor::new(FILESCAN), |fields| {
            Err(VolaError::malformed_identifier("pid", fields[0]))
        });
        assert!(matches!(result, Err(VolaError::MalformedIdentifier { .. })));
    }

    #[test]
    fn test_collect_in_order() {
        let parser = TableParser::for_artifact(ArtifactKind::FileScan);
        let offsets = parser
            .collect(Cursor::new(FILESCAN), |fields| Ok(fields[0].to_string()))
            .unwrap();
        assert_eq!(offsets, vec!["0xe0001", "0xe0003"]);
    }

    #[test]
    fn test_invalid_utf8_row_does_not_stop_the_scan() {
        let input = b"Offset\tName\tSize\n\
            0x1\t\\a.txt\t1\n\
            0x2\t\\caf\xE9.txt\t1\n\
            0x3\t\\b.txt\t1\r\n\
            0x4\t\\c.txt\t1\n";
        let parser = TableParser::for_artifact(ArtifactKind::FileScan);
        let mut paths = Vec::new();
        let summary = parser
            .parse(Cursor::new(&input[..]), |fields| {
                paths.push(fields[1].to_string());
                Ok(())
            })
            .unwrap();

        assert!(!summary.truncated);
        assert_eq!(summary.rows, 4);
        assert_eq!(paths[1], "\\caf\u{FFFD}.txt");
        assert_eq!(paths[2], "\\b.txt");
        assert_eq!(paths[3], "\\c.txt");
    }

    #[test]
    fn test_drifted_header_is_reported_in_summary() {
        let (rows, summary) = rows("Offset(P)\tFileName\tBytes\n0x1\ta.txt\t1\n");
        assert!(!summary.header_found);
        assert_eq!(summary.rows, 0);
        assert!(rows.is_empty());
    }

    /// Serves a fixed prefix, then fails
    struct FailingReader {
        data: Cursor<Vec<u8>>,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.data.read(buf)?;
            if n == 0 {
                return Err(io::Error::new(io::ErrorKind::InvalidData, "corrupt"));
            }
            Ok(n)
        }
    }

    #[test]
    fn test_read_error_keeps_partial_rows() {
        let reader = BufReader::new(FailingReader {
            data: Cursor::new(b"Offset Name Size\n0x1 a 1\n0x2 b 2\n".to_vec()),
        });
        let parser = TableParser::for_artifact(ArtifactKind::FileScan);
        let offsets = parser.collect(reader, |fields| Ok(fields[0].to_string())).unwrap();
        assert_eq!(offsets, vec!["0x1", "0x2"]);

        let reader = BufReader::new(FailingReader {
            data: Cursor::new(b"Offset Name Size\n0x1 a 1\n".to_vec()),
        });
        let summary = parser.parse(reader, |_| Ok(())).unwrap();
        assert!(summary.truncated);
        assert_eq!(summary.rows, 1);
    }
}
