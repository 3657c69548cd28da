//! `bugscope-ocr`: turns a screenshot of code into text.

pub mod adapter;
pub mod vision;

pub use adapter::{collapse_blank_lines, OcrAdapter};
pub use vision::{parse_annotate_response, GoogleVisionEngine};
