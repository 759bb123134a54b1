//! Prompt Builder — renders the single bounded prompt sent to the completion service.
//!
//! Output is a pure function of its inputs: identical tier and selection always give a
//! byte-identical prompt.
//!
//! Two payload modes:
//! - `Markers` (default): only the matched `marker = genotype` pairs, in catalog order.
//!   Bounded by the size of the tier's marker set, so no ceiling applies.
//! - `RawText`: the uploaded file text, prefix-truncated at a character ceiling.
//!   Only the payload is ever cut, never the instructions.

use std::fmt::Write as _;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalog::TierDefinition;
use crate::genotype::selector::MarkerSelection;
use crate::llm_client::prompts::{
    MARKDOWN_OUTPUT_INSTRUCTION, NON_DIAGNOSTIC_INSTRUCTION, NO_ECHO_INSTRUCTION,
};
use crate::report::prompts::{
    MARKER_DATA_HEADING, RAW_TEXT_DATA_HEADING, REPORT_PROMPT_TEMPLATE, REPORT_SYSTEM_FRAMING,
    TRUNCATION_NOTICE,
};

/// Character ceiling for whole-file payloads.
pub const DEFAULT_MAX_PROMPT_CHARS: usize = 120_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptMode {
    #[default]
    Markers,
    RawText,
}

impl FromStr for PromptMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "markers" => Ok(PromptMode::Markers),
            "raw_text" | "raw-text" => Ok(PromptMode::RawText),
            other => Err(format!("expected 'markers' or 'raw_text', got '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltPrompt {
    pub text: String,
    /// True when the data payload was cut at the character ceiling.
    pub truncated: bool,
}

/// Builds a prompt that carries only the matched marker pairs.
pub fn build_prompt(tier: &TierDefinition, selection: &MarkerSelection) -> BuiltPrompt {
    let heading = MARKER_DATA_HEADING
        .replace("{matched}", &selection.matched_count().to_string())
        .replace("{required}", &tier.required_markers.len().to_string());

    BuiltPrompt {
        text: render(tier, &heading, &render_marker_payload(tier, selection)),
        truncated: false,
    }
}

/// Builds a prompt that embeds the uploaded file text, cut to `max_chars` characters.
pub fn build_raw_text_prompt(tier: &TierDefinition, raw_text: &str, max_chars: usize) -> BuiltPrompt {
    let (payload, truncated) = truncate_chars(raw_text, max_chars);
    let payload = if truncated {
        format!("{payload}\n{TRUNCATION_NOTICE}")
    } else {
        payload.to_string()
    };

    BuiltPrompt {
        text: render(tier, RAW_TEXT_DATA_HEADING, &payload),
        truncated,
    }
}

fn render(tier: &TierDefinition, data_heading: &str, payload: &str) -> String {
    let framing = REPORT_SYSTEM_FRAMING.replace("{tier_label}", tier.label);

    // payload goes in last so text inside it is never treated as a placeholder
    REPORT_PROMPT_TEMPLATE
        .replace("{system_framing}", &framing)
        .replace("{non_diagnostic_instruction}", NON_DIAGNOSTIC_INSTRUCTION)
        .replace("{no_echo_instruction}", NO_ECHO_INSTRUCTION)
        .replace("{output_instruction}", MARKDOWN_OUTPUT_INSTRUCTION)
        .replace("{section_directive}", &render_section_directive(tier))
        .replace("{data_heading}", data_heading)
        .replace("{data_payload}", payload)
}

/// One numbered line per section, in template order.
fn render_section_directive(tier: &TierDefinition) -> String {
    let mut out = String::new();
    for (i, section) in tier.sections.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = write!(out, "{}. {}: {}", i + 1, section.title, section.guidance);
    }
    out
}

fn render_marker_payload(tier: &TierDefinition, selection: &MarkerSelection) -> String {
    let mut out = String::new();
    for marker in &tier.required_markers {
        if let Some(genotype) = selection.matched_markers.get(marker.id) {
            if !out.is_empty() {
                out.push('\n');
            }
            let _ = write!(out, "- {}: {} = {}", marker.gene, marker.id, genotype);
        }
    }
    out
}

/// Returns the first `max_chars` characters of `text` and whether anything was cut.
fn truncate_chars(text: &str, max_chars: usize) -> (&str, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => (&text[..byte_idx], true),
        None => (text, false),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::catalog::{lookup, TierId};

    fn selection(tier: TierId, pairs: &[(&str, &str)]) -> MarkerSelection {
        MarkerSelection {
            tier_id: tier,
            matched_markers: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
            total_markers_scanned: pairs.len(),
        }
    }

    #[test]
    fn test_build_is_deterministic() {
        let tier = lookup(TierId::Core);
        let sel = selection(TierId::Core, &[("rs4680", "AG"), ("rs1815739", "CC")]);
        assert_eq!(build_prompt(tier, &sel), build_prompt(tier, &sel));
    }

    #[test]
    fn test_sections_rendered_in_template_order() {
        let tier = lookup(TierId::Elite);
        let prompt = build_prompt(tier, &selection(TierId::Elite, &[("rs4343", "AG")])).text;

        let mut last = 0;
        for (i, section) in tier.sections.iter().enumerate() {
            let line = format!("{}. {}: ", i + 1, section.title);
            let pos = prompt.find(&line).unwrap_or_else(|| panic!("missing {line}"));
            assert!(pos >= last, "{} out of order", section.title);
            last = pos;
        }
    }

    #[test]
    fn test_marker_payload_follows_catalog_order() {
        let tier = lookup(TierId::Snapshot);
        let sel = selection(TierId::Snapshot, &[("rs9939609", "AT"), ("rs1815739", "CC")]);
        let prompt = build_prompt(tier, &sel).text;

        let actn3 = prompt.find("- ACTN3: rs1815739 = CC").unwrap();
        let fto = prompt.find("- FTO: rs9939609 = AT").unwrap();
        assert!(actn3 < fto);
        assert!(!prompt.contains("rs762551"));
        assert!(prompt.contains("2 of 3 tier markers present"));
    }

    #[test]
    fn test_framing_and_constraints_present() {
        let tier = lookup(TierId::Performance);
        let prompt = build_prompt(tier, &selection(TierId::Performance, &[("rs4680", "GG")]));
        assert!(!prompt.truncated);
        assert!(prompt.text.contains("\"Methylation+ Performance\" report tier"));
        assert!(prompt.text.contains(NON_DIAGNOSTIC_INSTRUCTION));
        assert!(prompt.text.contains(NO_ECHO_INSTRUCTION));
        assert!(prompt.text.contains("Disclaimer"));
    }

    #[test]
    fn test_raw_text_under_ceiling_is_untouched() {
        let tier = lookup(TierId::Snapshot);
        let raw = "rs1815739\t11\t1\tCC\n";
        let prompt = build_raw_text_prompt(tier, raw, 1_000);
        assert!(!prompt.truncated);
        assert!(prompt.text.ends_with(raw));
        assert!(!prompt.text.contains(TRUNCATION_NOTICE));
    }

    #[test]
    fn test_raw_text_truncates_payload_only() {
        let tier = lookup(TierId::Snapshot);
        let raw = "x".repeat(500);
        let prompt = build_raw_text_prompt(tier, &raw, 100);
        assert!(prompt.truncated);
        assert!(prompt.text.contains(&format!("{}\n{}", "x".repeat(100), TRUNCATION_NOTICE)));
        assert!(!prompt.text.contains(&"x".repeat(101)));
        // instructions survive intact
        assert!(prompt.text.contains(NON_DIAGNOSTIC_INSTRUCTION));
        assert!(prompt.text.contains("Disclaimer"));
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        let (cut, truncated) = truncate_chars("ééé", 2);
        assert_eq!(cut, "éé");
        assert!(truncated);
        assert_eq!(truncate_chars("abc", 3), ("abc", false));
    }

    #[test]
    fn test_placeholders_in_payload_are_not_expanded() {
        let tier = lookup(TierId::Snapshot);
        let prompt = build_raw_text_prompt(tier, "{tier_label} {data_payload}", 1_000);
        assert!(prompt.text.ends_with("{tier_label} {data_payload}"));
    }

    #[test]
    fn test_prompt_mode_from_str() {
        assert_eq!("Markers".parse::<PromptMode>(), Ok(PromptMode::Markers));
        assert_eq!("raw-text".parse::<PromptMode>(), Ok(PromptMode::RawText));
        assert!("full".parse::<PromptMode>().is_err());
    }
}
