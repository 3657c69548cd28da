//! Extension-based type detection for uploads.

/// Detect an image MIME type from a lowercased extension.
pub fn image_mime_for_extension(ext: &str) -> Option<&'static str> {
    match ext {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png"          => Some("image/png"),
        "gif"          => Some("image/gif"),
        "webp"         => Some("image/webp"),
        "bmp"          => Some("image/bmp"),
        "tiff" | "tif" => Some("image/tiff"),
        _              => None,
    }
}

/// Language label for a source file extension, used to tag prompts.
pub fn language_for_extension(ext: &str) -> Option<&'static str> {
    match ext {
        "py"                       => Some("python"),
        "js" | "jsx"               => Some("javascript"),
        "ts" | "tsx"               => Some("typescript"),
        "java"                     => Some("java"),
        "c" | "h"                  => Some("c"),
        "cpp" | "hpp" | "cc"       => Some("cpp"),
        "cs"                       => Some("csharp"),
        "go"                       => Some("go"),
        "rb"                       => Some("ruby"),
        "rs"                       => Some("rust"),
        "php"                      => Some("php"),
        "swift"                    => Some("swift"),
        "kt"                       => Some("kotlin"),
        "scala"                    => Some("scala"),
        "sql"                      => Some("sql"),
        "sh"                       => Some("bash"),
        _                          => None,
    }
}

/// File extension for generated code in the given language.
///
/// Unknown languages fall back to `txt`.
pub fn extension_for_language(language: &str) -> &'static str {
    match language.trim().to_ascii_lowercase().as_str() {
        "python"                 => "py",
        "javascript"             => "js",
        "typescript"             => "ts",
        "java"                   => "java",
        "c++" | "cpp"            => "cpp",
        "c"                      => "c",
        "c#" | "csharp"          => "cs",
        "go"                     => "go",
        "ruby"                   => "rb",
        "rust"                   => "rs",
        "php"                    => "php",
        "swift"                  => "swift",
        "kotlin"                 => "kt",
        "scala"                  => "scala",
        "sql"                    => "sql",
        "bash" | "shell"         => "sh",
        _                        => "txt",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_jpeg_variants() {
        assert_eq!(image_mime_for_extension("jpg"), Some("image/jpeg"));
        assert_eq!(image_mime_for_extension("jpeg"), Some("image/jpeg"));
        assert_eq!(image_mime_for_extension("py"), None);
    }

    #[test]
    fn maps_languages_both_ways() {
        assert_eq!(language_for_extension("tsx"), Some("typescript"));
        assert_eq!(extension_for_language("C++"), "cpp");
        assert_eq!(extension_for_language("Brainfuck"), "txt");
    }
}
