// Resume screening: role catalogue, compatibility scoring, and the end-to-end pipeline.
// All model calls go through llm_client via the CompatibilityScorer trait.

pub mod handlers;
pub mod pipeline;
pub mod roles;
pub mod scorer;
pub mod verdict;
