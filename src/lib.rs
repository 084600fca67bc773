//! gemini-research-rs: scheduled Gemini research agent.
//!
//! Shared modules for the research service and the `research-once` and
//! `gemini-chat` binaries.

pub mod config;
pub mod gemini;
pub mod history;
pub mod prompt;
pub mod report;
pub mod service;
pub mod speech;
