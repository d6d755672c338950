//! Interaction provider adapters.
//!
//! The terminal provider lives in the CLI; these cover non-interactive runs
//! and tests.

mod preset;
mod scripted;

pub use preset::{PresetInteraction, coerce_answer};
pub use scripted::ScriptedInteraction;
