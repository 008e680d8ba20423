//! Normalization of OpenAI-compatible completion choices.
//!
//! Servers disagree on where assistant text and reasoning live. `classify`
//! reduces one raw choice to an `(answer, reasoning)` pair and `compose`
//! serializes that pair into the single string handed back to the caller.

mod classify;
mod compose;
mod segments;
mod shape;

pub use classify::{classify, ClassifiedResponse, ReasoningSource, REASONING_SOURCES};
pub use compose::{compose, wrap_reasoning, THINK_CLOSE, THINK_OPEN};
pub use segments::SegmentRole;
pub use shape::{flatten_text, ContentShape};
