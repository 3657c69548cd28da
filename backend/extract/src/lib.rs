//! `bugscope-extract`: structured results from unreliable model replies.
//!
//! Replies are run through a chain of [`ParseTier`]s, strictest first:
//! direct JSON, repaired JSON (including an object embedded in prose), then
//! markdown headings. If every tier declines, the result carries an error
//! naming each tier's reason.

pub mod extractor;
pub mod generated;
pub mod json_tier;
pub mod markdown_tier;
pub mod render;
pub mod repair;
pub mod sanitize;
pub mod shape;
pub mod tier;

pub use extractor::Extractor;
pub use generated::parse_generated;
pub use json_tier::{DirectJsonTier, RepairedJsonTier};
pub use markdown_tier::{first_fenced_block, MarkdownTier};
pub use render::render_markdown;
pub use tier::{ParseTier, TierMiss};
