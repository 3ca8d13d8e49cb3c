// Lead intake: score a submitted lead form (model-backed or rule-based) and
// keep it in the in-process lead list.

pub mod handlers;
pub mod prompts;
pub mod scorer;
pub mod store;
