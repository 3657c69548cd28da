use std::fmt;

use bugscope_core::AnalysisResult;

/// Why a tier declined a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierMiss {
    pub reason: String,
}

impl TierMiss {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for TierMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

/// One parsing strategy in the extraction chain.
///
/// A tier either returns a fully shaped result or declines; it never returns
/// a partially filled one.
pub trait ParseTier: Send + Sync {
    fn name(&self) -> &'static str;

    fn try_parse(&self, raw: &str) -> Result<AnalysisResult, TierMiss>;
}
