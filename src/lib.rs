//! takedown-letters library crate
//!
//! The AI generation pipeline behind a takedown-request letter wizard:
//! accumulated case facts, gap analysis, deterministic prompt assembly with
//! platform policy redaction, a typed gateway to the text-generation service,
//! lenient response parsing, and a bounded quality-check/rewrite loop.

pub mod api;
pub mod case;
pub mod config;
pub mod gaps;
pub mod letter;
pub mod llm;
pub mod pipeline;
pub mod policy;

#[cfg(test)]
pub(crate) mod testing;
