//! Prompt module for LLM-based operations.
//!
//! This module provides modular prompt templates for various LLM tasks.

pub mod field_extraction;

pub use field_extraction::*;
