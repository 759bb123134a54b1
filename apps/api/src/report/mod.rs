// Report generation: prompt construction, the completion call, persistence,
// and the upload pipeline that ties them to the genotype stages.
// All completion calls go through llm_client — nothing here talks HTTP to the model.

pub mod generator;
pub mod handlers;
pub mod prompt_builder;
pub mod prompts;
pub mod store;
pub mod upload;
