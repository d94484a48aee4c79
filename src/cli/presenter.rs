//! CLI presenter for output formatting

use std::time::Duration;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::domain::session::{SessionStatus, SessionView, VerdictMetrics};

/// Width of the level meter in cells
const METER_WIDTH: usize = 20;

/// Presenter for CLI output formatting
pub struct Presenter {
    spinner: Option<ProgressBar>,
}

impl Presenter {
    /// Create a new presenter
    pub fn new() -> Self {
        Self { spinner: None }
    }

    /// Start a spinner with message
    pub fn start_spinner(&mut self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
        {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(80));
        self.spinner = Some(spinner);
    }

    /// Update spinner message
    pub fn update_spinner(&self, message: &str) {
        if let Some(ref spinner) = self.spinner {
            spinner.set_message(message.to_string());
        }
    }

    /// Stop spinner without status
    pub fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    pub fn is_spinning(&self) -> bool {
        self.spinner.is_some()
    }

    /// Print info message to stderr
    pub fn info(&self, message: &str) {
        eprintln!("{} {}", "ℹ".cyan(), message);
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Output text to stdout
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Print a key-value pair (for config list)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }

    /// Render a status change. Recording and Processing drive the
    /// spinner; terminal states print the outcome.
    pub fn status(&mut self, view: &SessionView) {
        if view.status.is_busy() {
            if self.is_spinning() {
                self.update_spinner(&view.message);
            } else {
                self.start_spinner(&view.message);
            }
            return;
        }

        self.stop_spinner();
        match view.status {
            SessionStatus::Success => self.success(&view.message),
            SessionStatus::Failure => self.error(&view.message),
            _ => self.info(&view.message),
        }
    }

    /// Update the spinner with the live input level
    pub fn level(&self, message: &str, level: f32) {
        self.update_spinner(&format!("{} {}", message, self.format_meter(level)));
    }

    /// Format a 0..=255 input level as a bar
    pub fn format_meter(&self, level: f32) -> String {
        let fraction = (level / 255.0).clamp(0.0, 1.0);
        let filled = (fraction * METER_WIDTH as f32).round() as usize;
        let empty = METER_WIDTH - filled;
        format!("[{}{}]", "█".repeat(filled).green(), "░".repeat(empty))
    }

    /// Print verdict metrics to stdout
    pub fn metrics(&self, metrics: &VerdictMetrics) {
        for (key, value) in Self::metric_rows(metrics) {
            self.key_value(key, &value);
        }
    }

    fn metric_rows(metrics: &VerdictMetrics) -> Vec<(&'static str, String)> {
        let mut rows = vec![("confidence", metrics.confidence_percent())];
        if let Some(is_live) = metrics.is_live {
            rows.push(("live", if is_live { "yes" } else { "no" }.to_string()));
        }
        if let Some(score) = metrics.speaker_score {
            rows.push(("speaker_score", format!("{:.3}", score)));
        }
        if let Some(score) = metrics.liveness_score {
            rows.push(("liveness_score", format!("{:.3}", score)));
        }
        if let Some(ms) = metrics.processing_time() {
            rows.push(("processing_time", format!("{:.0}ms", ms)));
        }
        rows
    }

    /// Notice shown when the health probe fails
    pub fn offline(&self, server_url: &str) {
        self.warn(&format!("Cannot connect to backend server at {}", server_url));
    }

    /// Connectivity line for `health` and `status`
    pub fn connectivity(&self, server_url: &str, online: bool) {
        if online {
            eprintln!("{} Connected to {}", "●".green(), server_url);
        } else {
            eprintln!("{} Disconnected from {}", "●".red(), server_url);
        }
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::session::SessionMode;

    fn cells(meter: &str) -> usize {
        meter.matches('█').count()
    }

    #[test]
    fn meter_empty_at_silence() {
        let presenter = Presenter::new();
        assert_eq!(cells(&presenter.format_meter(0.0)), 0);
    }

    #[test]
    fn meter_full_at_max() {
        let presenter = Presenter::new();
        assert_eq!(cells(&presenter.format_meter(255.0)), METER_WIDTH);
        assert_eq!(cells(&presenter.format_meter(400.0)), METER_WIDTH);
    }

    #[test]
    fn meter_half() {
        let presenter = Presenter::new();
        assert_eq!(cells(&presenter.format_meter(127.5)), METER_WIDTH / 2);
    }

    #[test]
    fn enrolled_metrics_rows() {
        let rows = Presenter::metric_rows(&VerdictMetrics::enrolled());
        assert_eq!(rows[0], ("confidence", "100.0%".to_string()));
        assert_eq!(rows[1], ("live", "yes".to_string()));
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn full_metrics_rows() {
        let metrics = VerdictMetrics {
            confidence: 0.42,
            is_live: Some(false),
            speaker_score: Some(0.5),
            liveness_score: Some(0.25),
            processing_time_ms: Some(123.0),
        };
        let rows = Presenter::metric_rows(&metrics);
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].1, "42.0%");
        assert_eq!(rows[1].1, "no");
        assert_eq!(rows[4].1, "123ms");
    }

    #[test]
    fn spinner_follows_busy_states() {
        let mut presenter = Presenter::new();
        let mut view = SessionView::idle(SessionMode::Authenticate);

        view.status = SessionStatus::Recording;
        presenter.status(&view);
        assert!(presenter.is_spinning());

        view.status = SessionStatus::Processing;
        presenter.status(&view);
        assert!(presenter.is_spinning());

        view.status = SessionStatus::Failure;
        presenter.status(&view);
        assert!(!presenter.is_spinning());
    }

    #[test]
    fn zero_processing_time_is_hidden() {
        let metrics = VerdictMetrics {
            processing_time_ms: Some(0.0),
            ..Default::default()
        };
        assert_eq!(Presenter::metric_rows(&metrics).len(), 1);
    }
}
