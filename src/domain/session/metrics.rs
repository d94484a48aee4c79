//! Verdict metrics reported by the authentication service

/// Structured scores attached to a finished session.
/// Only present when the service actually answered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VerdictMetrics {
    pub confidence: f64,
    pub is_live: Option<bool>,
    pub speaker_score: Option<f64>,
    pub liveness_score: Option<f64>,
    pub processing_time_ms: Option<f64>,
}

impl VerdictMetrics {
    /// Metrics reported for a completed enrollment
    pub fn enrolled() -> Self {
        Self {
            confidence: 1.0,
            is_live: Some(true),
            ..Default::default()
        }
    }

    /// Confidence as a percentage string, e.g. "42.0%"
    pub fn confidence_percent(&self) -> String {
        format!("{:.1}%", self.confidence * 100.0)
    }

    /// Processing time, when the service reported a positive one
    pub fn processing_time(&self) -> Option<f64> {
        self.processing_time_ms.filter(|ms| *ms > 0.0)
    }
}
