//! The extraction chain.

use bugscope_core::{AnalysisResult, ExtractionError, ExtractionSettings};
use tracing::debug;

use crate::json_tier::{DirectJsonTier, RepairedJsonTier};
use crate::markdown_tier::MarkdownTier;
use crate::tier::ParseTier;

/// Runs each tier in order and returns the first match.
///
/// Deterministic: the same input always yields the same result.
pub struct Extractor {
    tiers: Vec<Box<dyn ParseTier>>,
    excerpt_chars: usize,
}

impl Extractor {
    pub fn new(settings: ExtractionSettings) -> Self {
        Self {
            tiers: vec![
                Box::new(DirectJsonTier::new(settings.fields.clone())),
                Box::new(RepairedJsonTier::new(settings.fields.clone())),
                Box::new(MarkdownTier::new(settings.headings, settings.fields)),
            ],
            excerpt_chars: settings.excerpt_chars,
        }
    }

    pub fn try_extract(&self, raw: &str) -> Result<AnalysisResult, ExtractionError> {
        let mut misses = Vec::with_capacity(self.tiers.len());
        for tier in &self.tiers {
            match tier.try_parse(raw) {
                Ok(result) => {
                    debug!(tier = tier.name(), "Reply extracted");
                    return Ok(result);
                }
                Err(miss) => {
                    debug!(tier = tier.name(), reason = %miss, "Tier declined reply");
                    misses.push(format!("{}: {}", tier.name(), miss));
                }
            }
        }
        Err(ExtractionError {
            stages: misses.join("; "),
            excerpt: excerpt(raw, self.excerpt_chars),
        })
    }

    /// Like [`Extractor::try_extract`], folding failure into the result.
    pub fn extract(&self, raw: &str) -> AnalysisResult {
        self.try_extract(raw)
            .unwrap_or_else(|e| AnalysisResult::failed(e.to_string()))
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(ExtractionSettings::default())
    }
}

fn excerpt(raw: &str, max_chars: usize) -> String {
    let trimmed = raw.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}
