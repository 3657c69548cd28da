//! Upload and pasted-text validation.
//!
//! Rules run in a fixed order (size, type, encoding, length) and the first
//! violation wins. Nothing here performs I/O.

use bugscope_core::{
    InputContent, InputContext, InputKind, UploadArtifact, UploadLimits, ValidatedInput,
    ValidationError,
};
use tracing::debug;

use crate::mime_detect::{image_mime_for_extension, language_for_extension};

/// Validate an uploaded file for the given context.
pub fn validate_upload(
    artifact: &UploadArtifact,
    context: InputContext,
    limits: &UploadLimits,
) -> Result<ValidatedInput, ValidationError> {
    let result = match context {
        InputContext::Image => validate_image(artifact, limits),
        InputContext::SourceFile => validate_source_file(artifact, limits),
    };
    if let Err(ref e) = result {
        debug!(
            extension = %artifact.declared_extension,
            size = artifact.size,
            reason = %e,
            "Upload rejected"
        );
    }
    result
}

/// Validate code typed or pasted directly by the user. Passing text comes back unchanged.
pub fn validate_pasted_text(text: &str, limits: &UploadLimits) -> Result<String, ValidationError> {
    check_text(text, limits)?;
    Ok(text.to_string())
}

fn validate_image(
    artifact: &UploadArtifact,
    limits: &UploadLimits,
) -> Result<ValidatedInput, ValidationError> {
    if artifact.size > limits.max_image_bytes {
        return Err(ValidationError::TooLarge {
            size: artifact.size,
            limit: limits.max_image_bytes,
        });
    }

    let mime = image_mime_for_extension(&artifact.declared_extension)
        .unwrap_or("application/octet-stream");
    if !limits.allowed_image_types.iter().any(|t| t == mime) {
        return Err(ValidationError::DisallowedImageType {
            mime: mime.to_string(),
            allowed: limits.allowed_image_types.join(", "),
        });
    }

    Ok(ValidatedInput {
        kind: InputKind::Image,
        content: InputContent::Image {
            bytes: artifact.bytes.clone(),
            mime,
        },
        extension: artifact.declared_extension.clone(),
        language: None,
    })
}

fn validate_source_file(
    artifact: &UploadArtifact,
    limits: &UploadLimits,
) -> Result<ValidatedInput, ValidationError> {
    if artifact.size > limits.max_source_bytes {
        return Err(ValidationError::TooLarge {
            size: artifact.size,
            limit: limits.max_source_bytes,
        });
    }

    let ext = &artifact.declared_extension;
    if !limits.allowed_extensions.iter().any(|e| e == ext) {
        return Err(ValidationError::DisallowedExtension {
            extension: ext.clone(),
            allowed: limits.allowed_extensions.join(", "),
        });
    }

    let text = std::str::from_utf8(&artifact.bytes).map_err(|e| ValidationError::NotUtf8 {
        offset: e.valid_up_to(),
    })?;
    check_text(text, limits)?;

    Ok(ValidatedInput {
        kind: InputKind::SourceCode,
        content: InputContent::Text(text.to_string()),
        extension: ext.clone(),
        language: language_for_extension(ext).map(str::to_string),
    })
}

fn check_text(text: &str, limits: &UploadLimits) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::Empty);
    }
    let chars = text.chars().count();
    if chars > limits.max_code_chars {
        return Err(ValidationError::TooLong {
            chars,
            limit: limits.max_code_chars,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> UploadLimits {
        UploadLimits::default()
    }

    #[test]
    fn source_file_passes_through_unchanged() {
        let body = "def f(x):\n\treturn x  # ünïcode\r\n";
        let artifact = UploadArtifact::new("script.py", body.as_bytes().to_vec());
        let input = validate_upload(&artifact, InputContext::SourceFile, &limits()).unwrap();

        assert_eq!(input.kind, InputKind::SourceCode);
        assert_eq!(input.content, InputContent::Text(body.to_string()));
        assert_eq!(input.extension, "py");
        assert_eq!(input.language.as_deref(), Some("python"));
    }

    #[test]
    fn image_passes_with_mime() {
        let artifact = UploadArtifact::new("shot.JPG", vec![0xFF, 0xD8, 0xFF, 0x00]);
        let input = validate_upload(&artifact, InputContext::Image, &limits()).unwrap();

        assert_eq!(input.kind, InputKind::Image);
        assert_eq!(input.extension, "jpg");
        match input.content {
            InputContent::Image { bytes, mime } => {
                assert_eq!(mime, "image/jpeg");
                assert_eq!(bytes.as_ref(), &[0xFF, 0xD8, 0xFF, 0x00]);
            }
            other => panic!("unexpected content {other:?}"),
        }
    }

    #[test]
    fn oversized_image_names_limit() {
        let mut l = limits();
        l.max_image_bytes = 4;
        let artifact = UploadArtifact::new("a.png", vec![0u8; 5]);
        let err = validate_upload(&artifact, InputContext::Image, &l).unwrap_err();

        assert_eq!(err, ValidationError::TooLarge { size: 5, limit: 4 });
        assert!(err.to_string().contains("4 byte limit"));
    }

    #[test]
    fn size_is_checked_before_type() {
        let mut l = limits();
        l.max_source_bytes = 2;
        let artifact = UploadArtifact::new("a.exe", b"abc".to_vec());
        let err = validate_upload(&artifact, InputContext::SourceFile, &l).unwrap_err();
        assert!(matches!(err, ValidationError::TooLarge { .. }));
    }

    #[test]
    fn disallowed_extension_is_rejected() {
        let artifact = UploadArtifact::new("notes.docx", b"hello".to_vec());
        let err = validate_upload(&artifact, InputContext::SourceFile, &limits()).unwrap_err();
        match err {
            ValidationError::DisallowedExtension { extension, allowed } => {
                assert_eq!(extension, "docx");
                assert!(allowed.contains("py"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn gif_is_not_an_allowed_image() {
        let artifact = UploadArtifact::new("anim.gif", vec![1, 2, 3]);
        let err = validate_upload(&artifact, InputContext::Image, &limits()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::DisallowedImageType {
                mime: "image/gif".into(),
                allowed: "image/png, image/jpeg".into(),
            }
        );
    }

    #[test]
    fn undecodable_bytes_report_offset() {
        let artifact = UploadArtifact::new("main.rs", vec![b'f', b'n', 0xC3, 0x28]);
        let err = validate_upload(&artifact, InputContext::SourceFile, &limits()).unwrap_err();
        assert_eq!(err, ValidationError::NotUtf8 { offset: 2 });
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let mut l = limits();
        l.max_code_chars = 3;
        // three characters, six bytes
        assert!(validate_pasted_text("ééé", &l).is_ok());
        let err = validate_pasted_text("éééé", &l).unwrap_err();
        assert_eq!(err, ValidationError::TooLong { chars: 4, limit: 3 });
    }

    #[test]
    fn whitespace_only_paste_is_empty() {
        assert_eq!(
            validate_pasted_text(" \n\t ", &limits()).unwrap_err(),
            ValidationError::Empty
        );
    }

    #[test]
    fn pasted_text_passes_through_unchanged() {
        let code = "  x = 1\r\n\tprint(x)  \n";
        assert_eq!(validate_pasted_text(code, &limits()).unwrap(), code);
    }
}
