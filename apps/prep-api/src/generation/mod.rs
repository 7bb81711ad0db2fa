// Resume generation: prompt assembly around the locked template, completion
// call, output normalization. All upstream calls go through llm_client.

pub mod generator;
pub mod handlers;
pub mod prompts;
