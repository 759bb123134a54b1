// All LLM prompt constants for the Report module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Role framing placed at the top of every report prompt. Replace `{tier_label}`.
pub const REPORT_SYSTEM_FRAMING: &str = "You are StrataHelix, a DNA-powered wellness assistant. \
    You write a personalised, non-medical wellness report from a consumer raw genotype export. \
    The user purchased the \"{tier_label}\" report tier.";

/// Report generation prompt template.
/// Replace: {system_framing}, {non_diagnostic_instruction}, {no_echo_instruction},
///          {output_instruction}, {section_directive}, {data_heading}, {data_payload}
pub const REPORT_PROMPT_TEMPLATE: &str = r#"{system_framing}

{non_diagnostic_instruction}

{no_echo_instruction}

{output_instruction}

REQUIRED SECTIONS, in this exact order:
{section_directive}

{data_heading}
{data_payload}"#;

/// Heading for discrete marker context. Replace: {matched}, {required}
pub const MARKER_DATA_HEADING: &str =
    "GENOTYPE CONTEXT ({matched} of {required} tier markers present; gene: marker = genotype):";

/// Heading for whole-file context.
pub const RAW_TEXT_DATA_HEADING: &str =
    "RAW GENOTYPE FILE (only use markers that actually appear below):";

/// Appended after the raw payload when it was cut at the character ceiling.
pub const TRUNCATION_NOTICE: &str = "[... file truncated for prompt size limits ...]";

/// Body of the placeholder report returned when no completion service is configured.
/// Replace: {file_name}, {size_kb}, {matched}, {required}, {tier_label}
pub const DEMO_MODE_REPORT: &str = "Demo mode: AI report generation is disabled (no API key configured).

Upload complete for \"{file_name}\" ({size_kb} KB). {matched} of {required} {tier_label} markers were found in this file.

Configure a completion-service API key to generate the full narrative report.";
