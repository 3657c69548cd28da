pub mod error;
pub mod retry;
pub mod settings;
pub mod traits;
pub mod types;

pub use error::{BugscopeError, ExtractionError, TransportError, ValidationError};
pub use retry::{retry, RetryPolicy};
pub use settings::{
    ExtractionSettings, FieldAliases, HeadingLabels, ReplyFormat, SafetySetting, UploadLimits,
};
pub use traits::{LlmProvider, LlmRequest, LlmResponse, OcrEngine};
pub use types::{
    AnalysisMode, AnalysisRequest, AnalysisResult, CodeTemplate, GeneratedCode,
    GenerationRequest, InputContent, InputContext, InputKind, RawModelReply, UploadArtifact,
    ValidatedInput,
};
