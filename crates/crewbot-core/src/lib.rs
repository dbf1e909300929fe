#![deny(missing_docs)]
//! Crewbot core library.
//!
//! Intent routing, the agent crew, capability tools and the appointment store.

/// Agent crew: routing, personas and the tool-calling loop.
pub mod agent;
/// Durable appointment store and its storage backends.
pub mod appointments;
/// Configuration management.
pub mod config;
/// LLM providers and client.
pub mod llm;
/// Capability tools exposed to agents.
pub mod tools;
/// Utility functions.
pub mod utils;

#[cfg(test)]
pub mod testing;
