//! Marker Selector — intersects a parsed export with a tier's required marker set.
//!
//! Any non-empty intersection is sufficient: export formats cover different marker
//! panels, so completeness cannot be known in advance. An empty intersection is
//! terminal and generation must not be attempted.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::catalog::{TierDefinition, TierId};
use crate::genotype::parser::GenotypeFile;

#[derive(Debug, Clone, Serialize)]
pub struct MarkerSelection {
    pub tier_id: TierId,
    /// Required markers present in the export, genotypes copied verbatim.
    pub matched_markers: BTreeMap<String, String>,
    /// Number of distinct markers in the export that were examined.
    pub total_markers_scanned: usize,
}

impl MarkerSelection {
    pub fn is_insufficient(&self) -> bool {
        self.matched_markers.is_empty()
    }

    pub fn matched_count(&self) -> usize {
        self.matched_markers.len()
    }
}

pub fn select_markers(file: &GenotypeFile, tier: &TierDefinition) -> MarkerSelection {
    let matched_markers = tier
        .required_markers
        .iter()
        .filter_map(|m| file.get(m.id).map(|g| (m.id.to_string(), g.to_string())))
        .collect();

    MarkerSelection {
        tier_id: tier.id,
        matched_markers,
        total_markers_scanned: file.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{lookup, MarkerSpec};
    use crate::genotype::parser::parse_genotype_file;

    const SAMPLE: &str = "# comment\nrs1815739\t17\t12345\tCC\nrs9939609,16,54321,AT\n";

    fn single_marker_tier(id: &'static str) -> TierDefinition {
        TierDefinition {
            id: TierId::Snapshot,
            label: "Test",
            required_markers: vec![MarkerSpec { id, gene: "TEST" }],
            sections: vec![],
        }
    }

    #[test]
    fn test_snapshot_selection_from_sample() {
        let file = parse_genotype_file(SAMPLE.as_bytes());
        let selection = select_markers(&file, lookup(TierId::Snapshot));

        let expected = BTreeMap::from([
            ("rs1815739".to_string(), "CC".to_string()),
            ("rs9939609".to_string(), "AT".to_string()),
        ]);
        assert_eq!(selection.matched_markers, expected);
        assert_eq!(file.total_lines, 3);
        assert_eq!(selection.total_markers_scanned, 2);
        assert!(!selection.is_insufficient());
    }

    #[test]
    fn test_no_overlap_is_insufficient() {
        let file = parse_genotype_file(SAMPLE.as_bytes());
        let selection = select_markers(&file, &single_marker_tier("rs000000"));
        assert!(selection.matched_markers.is_empty());
        assert!(selection.is_insufficient());
    }

    #[test]
    fn test_matched_keys_are_always_required() {
        let input = "rs1815739\t1\t1\tCT\nrs4680\t22\t1\tAG\nrs999\t1\t1\tAA\nrs1801133\t1\t1\tCC\n";
        let file = parse_genotype_file(input.as_bytes());
        for tier in crate::catalog::all_tiers() {
            let selection = select_markers(&file, tier);
            for key in selection.matched_markers.keys() {
                assert!(tier.requires(key), "{} not required by {}", key, tier.id);
            }
        }
    }

    #[test]
    fn test_higher_tier_matches_more() {
        let input = "rs1815739\t1\t1\tCT\nrs4680\t22\t1\tAG\n";
        let file = parse_genotype_file(input.as_bytes());
        assert_eq!(select_markers(&file, lookup(TierId::Snapshot)).matched_count(), 1);
        assert_eq!(select_markers(&file, lookup(TierId::Core)).matched_count(), 2);
    }

    #[test]
    fn test_empty_file_is_insufficient() {
        let file = parse_genotype_file(b"# nothing here\n");
        assert!(select_markers(&file, lookup(TierId::Elite)).is_insufficient());
    }
}
