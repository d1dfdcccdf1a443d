use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Narrow progress-reporting capability.
///
/// The branch syncer only ever needs to announce which stage it is in, so
/// this is all it gets; no console machinery leaks into the core logic.
pub trait Progress {
    fn stage(&self, label: &str);
}

/// Progress sink that reports nothing.
pub struct Silent;

impl Progress for Silent {
    fn stage(&self, _label: &str) {}
}

/// Spinner style used during ongoing operations.
/// - Yellow spinner with animated braille-style frames.
/// - Displays the current message (`{wide_msg}`) next to the spinner.
fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("\x1b[33m{spinner}\x1b[0m {wide_msg}")
        .unwrap()
        .tick_strings(&["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"])
}

/// Style used when an operation finishes successfully.
fn ok_style() -> ProgressStyle {
    ProgressStyle::with_template("\x1b[32m✔\x1b[0m {wide_msg}").unwrap()
}

/// Style used when an operation ends with a warning.
fn warn_style() -> ProgressStyle {
    ProgressStyle::with_template("\x1b[33m⚠\x1b[0m {wide_msg}").unwrap()
}

/// Style used when an operation fails with an error.
fn err_style() -> ProgressStyle {
    ProgressStyle::with_template("\x1b[31m✘\x1b[0m {wide_msg}").unwrap()
}

/// A single console spinner with a mutable stage message.
pub struct Spinner {
    pb: ProgressBar,
}

impl Spinner {
    /// Start spinning with an initial message.
    pub fn start(msg: impl Into<String>) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(spinner_style());
        pb.set_message(msg.into());
        pb.enable_steady_tick(Duration::from_millis(80));
        Self { pb }
    }

    /// Replace the current message while spinning.
    pub fn update(&self, msg: impl Into<String>) {
        self.pb.set_message(msg.into());
    }

    /// Finish with a green check mark.
    pub fn succeed(self, msg: impl Into<String>) {
        self.pb.set_style(ok_style());
        self.pb.finish_with_message(msg.into());
    }

    /// Finish with a yellow warning mark.
    pub fn warn(self, msg: impl Into<String>) {
        self.pb.set_style(warn_style());
        self.pb.finish_with_message(msg.into());
    }

    /// Finish with a red cross.
    pub fn fail(self, msg: impl Into<String>) {
        self.pb.set_style(err_style());
        self.pb.finish_with_message(msg.into());
    }

    /// Stop and erase the spinner line.
    pub fn stop(self) {
        self.pb.finish_and_clear();
    }
}

impl Progress for Spinner {
    fn stage(&self, label: &str) {
        self.pb.set_message(label.to_string());
    }
}
