//! Audio encoding identifiers

/// Encodings tried in order when starting a recorder.
/// The list is a preference, not an inventory of what platforms offer.
pub const DEFAULT_ENCODING_CANDIDATES: &[&str] = &[
    "audio/webm;codecs=opus",
    "audio/webm",
    "audio/mp4",
    "audio/ogg;codecs=opus",
    "audio/wav",
];

/// Extension used for uploads when the encoding is unknown
pub const FALLBACK_EXTENSION: &str = "webm";

/// Normalize an encoding identifier for comparison: lowercase,
/// no whitespace around parameters.
pub fn normalize(mime: &str) -> String {
    mime.split(';')
        .map(|part| part.trim().to_lowercase())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(";")
}

/// The media type without parameters, e.g. "audio/webm" for "audio/webm;codecs=opus"
pub fn essence(mime: &str) -> String {
    mime.split(';')
        .next()
        .map(|s| s.trim().to_lowercase())
        .unwrap_or_default()
}

/// Whether two identifiers name the same encoding
pub fn same_encoding(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

/// File extension for an encoding identifier
pub fn file_extension(mime: &str) -> &'static str {
    match essence(mime).as_str() {
        "audio/webm" => "webm",
        "audio/mp4" => "mp4",
        "audio/ogg" => "ogg",
        "audio/wav" | "audio/x-wav" | "audio/wave" => "wav",
        "audio/flac" => "flac",
        "audio/mpeg" => "mp3",
        _ => FALLBACK_EXTENSION,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_whitespace_and_case() {
        assert_eq!(normalize("Audio/WebM; codecs=opus"), "audio/webm;codecs=opus");
        assert_eq!(normalize("audio/wav"), "audio/wav");
    }

    #[test]
    fn essence_drops_parameters() {
        assert_eq!(essence("audio/ogg;codecs=opus"), "audio/ogg");
        assert_eq!(essence(""), "");
    }

    #[test]
    fn same_encoding_is_parameter_sensitive() {
        assert!(same_encoding("audio/webm;codecs=opus", "audio/webm; codecs=opus"));
        assert!(!same_encoding("audio/webm;codecs=opus", "audio/webm"));
    }

    #[test]
    fn extensions() {
        assert_eq!(file_extension("audio/webm;codecs=opus"), "webm");
        assert_eq!(file_extension("audio/mp4"), "mp4");
        assert_eq!(file_extension("audio/ogg;codecs=opus"), "ogg");
        assert_eq!(file_extension("audio/wav"), "wav");
        assert_eq!(file_extension(""), "webm");
    }

    #[test]
    fn default_candidates_prefer_opus_webm() {
        assert_eq!(DEFAULT_ENCODING_CANDIDATES[0], "audio/webm;codecs=opus");
        assert_eq!(DEFAULT_ENCODING_CANDIDATES.len(), 5);
    }
}
