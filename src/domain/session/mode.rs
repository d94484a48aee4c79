//! Session mode value object

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::error::InvalidModeError;

/// Recording length for enrollment (5 seconds)
pub const ENROLL_DURATION_MS: u64 = 5000;

/// Recording length for authentication (3 seconds)
pub const AUTHENTICATE_DURATION_MS: u64 = 3000;

/// What a session asks the service to do with the captured voice.
/// Fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionMode {
    #[default]
    Authenticate,
    Enroll,
}

impl SessionMode {
    /// All modes, in display order
    pub const ALL: [SessionMode; 2] = [Self::Authenticate, Self::Enroll];

    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Authenticate => "authenticate",
            Self::Enroll => "enroll",
        }
    }

    /// Fixed recording duration for this mode
    pub const fn recording_duration(&self) -> Duration {
        match self {
            Self::Authenticate => Duration::from_millis(AUTHENTICATE_DURATION_MS),
            Self::Enroll => Duration::from_millis(ENROLL_DURATION_MS),
        }
    }

    /// Message shown while the microphone is live
    pub const fn recording_message(&self) -> &'static str {
        match self {
            Self::Authenticate => "Recording... Say your passphrase (3 seconds)",
            Self::Enroll => "Recording... Speak clearly for enrollment (5 seconds)",
        }
    }

    /// Message shown before anything has happened
    pub const fn idle_message(&self) -> &'static str {
        match self {
            Self::Authenticate => "Ready to authenticate",
            Self::Enroll => "Ready to enroll",
        }
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SessionMode {
    type Err = InvalidModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "authenticate" | "auth" => Ok(Self::Authenticate),
            "enroll" => Ok(Self::Enroll),
            _ => Err(InvalidModeError {
                input: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_are_fixed_per_mode() {
        assert_eq!(
            SessionMode::Enroll.recording_duration(),
            Duration::from_millis(5000)
        );
        assert_eq!(
            SessionMode::Authenticate.recording_duration(),
            Duration::from_millis(3000)
        );
    }

    #[test]
    fn parse_accepts_short_alias() {
        assert_eq!("auth".parse::<SessionMode>().unwrap(), SessionMode::Authenticate);
        assert_eq!(" Enroll ".parse::<SessionMode>().unwrap(), SessionMode::Enroll);
    }

    #[test]
    fn parse_rejects_unknown() {
        let err = "verify".parse::<SessionMode>().unwrap_err();
        assert_eq!(err.input, "verify");
    }

    #[test]
    fn default_is_authenticate() {
        assert_eq!(SessionMode::default(), SessionMode::Authenticate);
    }

    #[test]
    fn display_round_trips() {
        for mode in SessionMode::ALL {
            assert_eq!(mode.to_string().parse::<SessionMode>().unwrap(), mode);
        }
    }
}
