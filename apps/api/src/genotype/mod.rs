// Genotype ingestion: raw export parsing and tier-scoped marker selection.
// Both stages are pure functions over their inputs and hold no shared state.

pub mod parser;
pub mod selector;
