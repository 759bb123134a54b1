// Curated tier table. Each tier repeats the sections of the tier below it, with the
// guidance rewritten for its depth, and appends its own markers to the lower tier's.

use super::{MarkerSpec, SectionSpec, TierDefinition, TierId};

const SNAPSHOT_MARKERS: &[MarkerSpec] = &[
    marker("rs1815739", "ACTN3"),
    marker("rs9939609", "FTO"),
    marker("rs762551", "CYP1A2"),
];

const CORE_MARKERS: &[MarkerSpec] = &[
    marker("rs1801133", "MTHFR"),
    marker("rs4680", "COMT"),
    marker("rs1801260", "CLOCK"),
    marker("rs4988235", "MCM6"),
    marker("rs6265", "BDNF"),
    marker("rs5082", "APOA2"),
    marker("rs1544410", "VDR"),
    marker("rs8192678", "PPARGC1A"),
];

const PERFORMANCE_MARKERS: &[MarkerSpec] = &[
    marker("rs1801131", "MTHFR"),
    marker("rs1805087", "MTR"),
    marker("rs1801394", "MTRR"),
    marker("rs234706", "CBS"),
    marker("rs4880", "SOD2"),
    marker("rs1800629", "TNF"),
    marker("rs1800795", "IL6"),
    marker("rs1695", "GSTP1"),
];

const ELITE_MARKERS: &[MarkerSpec] = &[
    marker("rs1042713", "ADRB2"),
    marker("rs4343", "ACE"),
    marker("rs662", "PON1"),
    marker("rs1799883", "FABP2"),
    marker("rs12785878", "DHCR7"),
    marker("rs73598374", "ADA"),
    marker("rs5751876", "ADORA2A"),
    marker("rs2282679", "GC"),
];

const DISCLAIMER: SectionSpec = section(
    "Disclaimer",
    "State that this report is educational wellness content, not medical advice or a diagnosis, and that decisions should be discussed with a qualified professional.",
);

const fn marker(id: &'static str, gene: &'static str) -> MarkerSpec {
    MarkerSpec { id, gene }
}

const fn section(title: &'static str, guidance: &'static str) -> SectionSpec {
    SectionSpec { title, guidance }
}

pub(super) fn build_catalog() -> Vec<TierDefinition> {
    TierId::ALL.iter().map(|&id| build_tier(id)).collect()
}

fn build_tier(id: TierId) -> TierDefinition {
    TierDefinition {
        id,
        label: label(id),
        required_markers: markers_through(id),
        sections: sections(id),
    }
}

fn label(id: TierId) -> &'static str {
    match id {
        TierId::Snapshot => "Snapshot",
        TierId::Core => "Core",
        TierId::Performance => "Methylation+ Performance",
        TierId::Elite => "Elite",
    }
}

/// Markers of `id` and every tier below it, lowest tier first.
fn markers_through(id: TierId) -> Vec<MarkerSpec> {
    let layers: &[&[MarkerSpec]] = &[
        SNAPSHOT_MARKERS,
        CORE_MARKERS,
        PERFORMANCE_MARKERS,
        ELITE_MARKERS,
    ];
    layers[..=id as usize]
        .iter()
        .flat_map(|layer| layer.iter().copied())
        .collect()
}

fn sections(id: TierId) -> Vec<SectionSpec> {
    match id {
        TierId::Snapshot => vec![
            section("Executive Summary", "Three to four sentences previewing the most notable tendencies in this file."),
            section("Metabolism & Nutrition", "A short preview of caffeine and appetite-related tendencies with one practical idea."),
            section("Training & Recovery", "A short preview of power versus endurance leaning with one training idea."),
            section("Methylation & MTHFR", "One or two sentences noting that methylation is covered in depth in higher tiers."),
            section("Supplement Strategy", "A single-sentence teaser naming one supplement category worth exploring, without doses."),
            section("Top Actions", "Three to five simple, low-risk lifestyle levers to experiment with."),
            DISCLAIMER,
        ],
        TierId::Core => vec![
            section("Executive Summary", "A one-paragraph overview of the baseline wellness profile."),
            section("Metabolism & Nutrition", "Full coverage of caffeine metabolism, appetite, lactose tolerance and dietary fat response."),
            section("Training & Recovery", "Full coverage of training response and recovery tendencies with practical programming ideas."),
            section("Sleep & Circadian Profile", "Chronotype and sleep-timing tendencies with routine suggestions."),
            section("Mood, Stress & Cognition", "A basic look at stress response and focus tendencies in plain language."),
            section("Methylation & MTHFR", "A light mention of methylation-related variants and what they broadly influence."),
            section("Supplement Strategy", "A foundational stack of supplement categories aligned with the profile, without doses."),
            section("Top Actions", "The top action for each section above."),
            DISCLAIMER,
        ],
        TierId::Performance => vec![
            section("Executive Summary", "A one-paragraph overview emphasising methylation and performance themes."),
            section("Metabolism & Nutrition", "Full coverage of caffeine metabolism, appetite, lactose tolerance and dietary fat response."),
            section("Training & Recovery", "Expanded training and recovery guidance, including volume and deload considerations."),
            section("Sleep & Circadian Profile", "Expanded chronotype discussion tied to training timing."),
            section("Mood, Stress & Cognition", "Expanded stress-response and neurotransmitter-clearance tendencies."),
            section("Methylation & MTHFR", "A full plain-language section on folate and methylation pathway variants, without diagnoses."),
            section("Detox & Inflammation Support", "Antioxidant and inflammatory-response tendencies with lifestyle supports."),
            section("Supplement Strategy", "A full prioritised plan of supplement categories, ordered by relevance to the profile."),
            section("Top Actions", "A single global top-five list across all sections."),
            DISCLAIMER,
        ],
        TierId::Elite => vec![
            section("Executive Summary", "A one-paragraph strategic overview of the full profile."),
            section("Metabolism & Nutrition", "Full coverage of caffeine metabolism, appetite, lactose tolerance and dietary fat response."),
            section("Training & Recovery", "A deep dive into training response, recovery capacity and periodisation ideas."),
            section("Sleep & Circadian Profile", "Expanded chronotype discussion including adenosine and caffeine sensitivity."),
            section("Mood, Stress & Cognition", "Expanded stress-response and neurotransmitter-clearance tendencies."),
            section("Methylation & MTHFR", "A full plain-language section on folate and methylation pathway variants, without diagnoses."),
            section("Detox & Inflammation Support", "A deep dive into antioxidant and inflammatory-response tendencies."),
            section("Cardio-Metabolic Profile", "Blood-pressure, lipid-handling and vitamin D tendencies framed as lifestyle levers."),
            section("Daily Rhythm", "Suggested AM, pre-training and PM routine structure in non-medical language."),
            section("Supplement Strategy", "A prioritised plan plus an example daily stack structure of categories, without doses."),
            section("Top Actions", "An extended roadmap: first 30 days, 90 days and ongoing."),
            DISCLAIMER,
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_counts_grow_per_tier() {
        let counts: Vec<usize> = TierId::ALL
            .iter()
            .map(|&id| markers_through(id).len())
            .collect();
        assert_eq!(counts, vec![3, 11, 19, 27]);
    }

    #[test]
    fn test_section_guidance_is_single_line() {
        for id in TierId::ALL {
            for s in sections(id) {
                assert!(!s.guidance.contains('\n'), "{}: {}", id, s.title);
            }
        }
    }
}
