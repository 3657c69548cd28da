//! `bugscope-intake`: validation of uploads and pasted code before any
//! network call is made.

pub mod mime_detect;
pub mod validator;

pub use mime_detect::{extension_for_language, image_mime_for_extension, language_for_extension};
pub use validator::{validate_pasted_text, validate_upload};
