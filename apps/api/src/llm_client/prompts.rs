// Shared prompt constants.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// Scope constraint appended to every generation prompt.
pub const NON_DIAGNOSTIC_INSTRUCTION: &str = "\
    CRITICAL: This is educational wellness content, not medicine. \
    Do NOT diagnose, predict disease risk, or make clinical claims. \
    Describe tendencies, never certainties, and frame every suggestion as a low-risk lifestyle idea. \
    Never give supplement or medication doses.";

/// Keeps raw identifiers out of user-facing text.
pub const NO_ECHO_INSTRUCTION: &str = "\
    CRITICAL: The genotype data below is internal context only. \
    Do NOT reproduce marker identifiers (such as rsIDs) or raw genotype letters in the report. \
    Refer to genes or traits in plain language instead. \
    If a topic has no supporting marker in the data, say briefly that it is not covered by this file.";

/// Output formatting shared by every report tier.
pub const MARKDOWN_OUTPUT_INSTRUCTION: &str = "\
    Output clean markdown: one `##` heading per section, short paragraphs and bullet points. \
    Do NOT wrap the report in a code fence. Do NOT add sections beyond those listed.";
