//! Microphone acquisition constraints

/// Target sample rate for speech capture
pub const TARGET_SAMPLE_RATE: u32 = 16000;

/// Constraints requested when acquiring an input stream.
/// The processing flags are requests; a platform may not honor them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureConstraints {
    pub sample_rate: u32,
    pub channels: u16,
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
    pub auto_gain_control: bool,
}

impl CaptureConstraints {
    /// Mono, 16 kHz, with all voice processing enabled
    pub const fn speech() -> Self {
        Self {
            sample_rate: TARGET_SAMPLE_RATE,
            channels: 1,
            echo_cancellation: true,
            noise_suppression: true,
            auto_gain_control: true,
        }
    }
}

impl Default for CaptureConstraints {
    fn default() -> Self {
        Self::speech()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speech_constraints() {
        let c = CaptureConstraints::default();
        assert_eq!(c.sample_rate, 16000);
        assert_eq!(c.channels, 1);
        assert!(c.echo_cancellation && c.noise_suppression && c.auto_gain_control);
    }
}
