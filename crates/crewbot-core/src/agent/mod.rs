//! Agent orchestration
//!
//! A message is classified by the [`router::IntentRouter`], mapped to a
//! [`profile::Handler`] by the [`crew::Crew`], and answered by an
//! [`runner::AgentRunner`] running a tool-calling loop.

pub mod crew;
pub mod profile;
pub mod router;
pub mod runner;

pub use crew::Crew;
pub use profile::{AgentProfile, Handler, TaskSpec};
pub use router::{Intent, IntentRouter};
pub use runner::AgentRunner;

use crate::llm::LlmError;
use thiserror::Error;

/// Errors that end a crew run
#[derive(Error, Debug)]
pub enum CrewError {
    /// The reasoning endpoint failed
    #[error("LLM call failed: {0}")]
    Llm(#[from] LlmError),
    /// The agent kept calling tools past the turn cap
    #[error("Agent exceeded iteration limit ({0})")]
    IterationLimit(usize),
    /// The agent finished without any text
    #[error("Agent returned an empty answer")]
    EmptyAnswer,
}
