//! Progress reporting for bundle actions
//!
//! A spinner covers the quick phases (resolving, validating, building
//! checks). It is cleared before the backend starts because invocation
//! images write straight to the terminal.

use std::time::Duration;

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

pub trait ProgressReporter: Send + Sync {
    /// Show what is happening now
    fn step(&self, message: &str);

    /// Clear transient output and announce a long-running step
    fn start_action(&self, message: &str);

    /// Clear the reporter when the operation ends
    fn finish(&self);
}

/// Reporter used when stderr is not a terminal or output is unwanted
#[derive(Debug, Default)]
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {
    fn step(&self, _message: &str) {}

    fn start_action(&self, _message: &str) {}

    fn finish(&self) {}
}

/// Interactive spinner on stderr
pub struct SpinnerReporter {
    pb: ProgressBar,
}

impl SpinnerReporter {
    pub fn new() -> Self {
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        let pb = ProgressBar::new_spinner();
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(80));
        Self { pb }
    }
}

impl ProgressReporter for SpinnerReporter {
    fn step(&self, message: &str) {
        self.pb.set_message(message.to_string());
    }

    fn start_action(&self, message: &str) {
        self.pb.finish_and_clear();
        eprintln!("{} {message}", Style::new().cyan().bold().apply_to("==>"));
    }

    fn finish(&self) {
        self.pb.finish_and_clear();
    }
}

/// Spinner when stderr is a terminal, silence otherwise
pub fn reporter() -> Box<dyn ProgressReporter> {
    if console::Term::stderr().is_term() {
        Box::new(SpinnerReporter::new())
    } else {
        Box::new(SilentReporter)
    }
}
