//! `bugscope-assistant`: turns a user's code into an [`AnalysisResult`].
//!
//! [`AnalysisResult`]: bugscope_core::AnalysisResult

pub mod analyzer;
pub mod prompt;

pub use analyzer::{Assistant, GenerationOutcome, GenerationParams, InteractionResult, LastInteraction};
pub use prompt::{build_analysis_prompt, build_generation_prompt, mode_instructions};
