//! Genotype Parser — turns a consumer raw-data export into marker → genotype records.
//!
//! Accepted layout, one marker per line:
//!
//! ```text
//! # rsid  chromosome  position  genotype
//! rs1815739	11	66560624	CC
//! rs9939609,16,53786615,AT
//! ```
//!
//! Fields are separated by runs of tab, comma or space. Field 0 is the marker id and
//! field 3 the genotype; fields 1–2 are ignored. Malformed and comment lines are
//! skipped silently. Parsing never fails.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Minimum token count for a line to be treated as a data line.
const MIN_FIELDS: usize = 4;
const MARKER_FIELD: usize = 0;
const GENOTYPE_FIELD: usize = 3;

/// A single marker observation from the export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenotypeRecord {
    pub marker_id: String,
    pub genotype: String,
}

/// Parsed contents of one genotype export.
///
/// Marker ids are unique: a later line for the same marker overwrites the genotype of
/// the earlier one while keeping its original position.
#[derive(Debug, Clone, Default)]
pub struct GenotypeFile {
    records: Vec<GenotypeRecord>,
    index: HashMap<String, usize>,
    /// Every line in the input, including comments and skipped lines.
    pub total_lines: usize,
}

impl GenotypeFile {
    #[cfg(test)]
    pub fn records(&self) -> &[GenotypeRecord] {
        &self.records
    }

    pub fn get(&self, marker_id: &str) -> Option<&str> {
        self.index
            .get(marker_id)
            .map(|&i| self.records[i].genotype.as_str())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn insert(&mut self, record: GenotypeRecord) {
        match self.index.get(&record.marker_id) {
            Some(&i) => self.records[i].genotype = record.genotype,
            None => {
                self.index
                    .insert(record.marker_id.clone(), self.records.len());
                self.records.push(record);
            }
        }
    }
}

/// Parses raw export bytes. Invalid UTF-8 is replaced rather than rejected.
pub fn parse_genotype_file(raw: &[u8]) -> GenotypeFile {
    let text = String::from_utf8_lossy(raw);
    let mut file = GenotypeFile::default();

    for line in split_lines(&text) {
        file.total_lines += 1;
        if let Some(record) = parse_line(line) {
            file.insert(record);
        }
    }

    file
}

/// Splits on `\r\n`, `\n` or a lone `\r`. A terminating line break does not open an
/// extra (empty) line.
fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let bytes = text.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&text[start..i]);
                start = i + 1;
            }
            b'\r' => {
                lines.push(&text[start..i]);
                if bytes.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }

    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

fn parse_line(line: &str) -> Option<GenotypeRecord> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let tokens: Vec<&str> = line
        .split(['\t', ',', ' '])
        .filter(|t| !t.is_empty())
        .collect();
    if tokens.len() < MIN_FIELDS {
        return None;
    }

    let marker_id = unquote(tokens[MARKER_FIELD]);
    let genotype = unquote(tokens[GENOTYPE_FIELD]);
    if marker_id.is_empty() || genotype.is_empty() {
        return None;
    }

    Some(GenotypeRecord {
        marker_id: marker_id.to_string(),
        genotype: genotype.to_string(),
    })
}

/// Strips the double quotes some CSV exports wrap around every field.
fn unquote(token: &str) -> &str {
    token.trim_matches('"').trim()
}
