//! # donna-core
//!
//! Core types, traits, configuration, and error handling for the Donna
//! task assistant.

pub mod config;
pub mod error;
pub mod intent;
pub mod state;
pub mod task;
pub mod timeutil;
pub mod traits;

pub use error::DonnaError;
