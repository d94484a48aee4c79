//! Recorder encoding negotiation

use crate::domain::audio::DEFAULT_ENCODING_CANDIDATES;

use super::ports::EncodingSupport;

/// Picks the first candidate encoding the platform supports.
///
/// Candidate order is the only tie-break. When nothing matches the result
/// is `None` and the recorder falls back to the platform default.
#[derive(Debug, Clone)]
pub struct EncodingNegotiator {
    candidates: Vec<String>,
}

impl EncodingNegotiator {
    pub fn new<I, S>(candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            candidates: candidates.into_iter().map(Into::into).collect(),
        }
    }

    /// First supported candidate, if any
    pub fn select<P: EncodingSupport + ?Sized>(&self, platform: &P) -> Option<String> {
        select_encoding(&self.candidates, platform)
    }
}

impl Default for EncodingNegotiator {
    fn default() -> Self {
        Self::new(DEFAULT_ENCODING_CANDIDATES.iter().copied())
    }
}

/// First candidate reported as supported by `platform`
pub fn select_encoding<S, P>(candidates: &[S], platform: &P) -> Option<String>
where
    S: AsRef<str>,
    P: EncodingSupport + ?Sized,
{
    candidates
        .iter()
        .map(AsRef::as_ref)
        .find(|mime| platform.is_type_supported(mime))
        .map(str::to_string)
}
