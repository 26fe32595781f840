//! # donna-dialogue
//!
//! Multi-turn dialogue orchestration: intent routing, the clarification
//! state machine, scheduling-conflict resolution, and deterministic reply
//! formatting.
//!
//! The [`Orchestrator`] is the single entry point. Everything that talks to
//! a language model goes through the [`IntentOracle`] and [`PhrasingOracle`]
//! traits from `donna-core`, so the whole crate is testable with scripted
//! oracles and an in-memory store.
//!
//! [`IntentOracle`]: donna_core::traits::IntentOracle
//! [`PhrasingOracle`]: donna_core::traits::PhrasingOracle

mod clarification;
mod conflict;
mod creation;
mod orchestrator;
mod query;
mod reply;
mod update;

pub use conflict::{resolve_target, RescheduleTarget};
pub use creation::{create_from_intent, CreateOutcome, CONFIDENCE_GATE};
pub use orchestrator::Orchestrator;
pub use query::TimeFrame;

#[cfg(test)]
mod tests;
