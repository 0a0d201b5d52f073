// Resume analysis: input validation, a single provider call, result stamping
// and best-effort persistence. Retrying is left to the caller.

pub mod handlers;
pub mod orchestrator;
