//! Incremental, resumable transcript summarization.
//!
//! The engine turns an arbitrarily large session transcript into one
//! coherent narrative by walking it in bounded line-range chunks, calling
//! the generation provider once per chunk, and committing a checkpoint
//! after every success. Interrupted runs resume from the first missing
//! chunk; completed sessions short-circuit without any provider call.
//!
//! Pipeline per chunk: select a model with remaining daily quota, wait out
//! the rate governor, execute the call under the retry controller, fold
//! the response into the cumulative summary, persist the checkpoint, and
//! record quota usage.

pub mod compositor;
pub mod executor;
pub mod governor;
pub mod orchestrator;
pub mod planner;
pub mod selector;

pub use orchestrator::SummaryOrchestrator;
