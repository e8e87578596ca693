use crate::output::Output;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::time::Duration;

/// Spinner shown on stderr while a network call is in flight
///
/// Only drawn for human output on an interactive terminal; otherwise the
/// message goes to the log.
pub struct Spinner {
    bar: Option<ProgressBar>,
}

impl Spinner {
    pub fn start(message: impl Into<String>, output: &Output) -> Self {
        let message = message.into();
        if !output.is_human() || !is_interactive() {
            tracing::info!(operation = "progress", message = %message, "Working");
            return Self { bar: None };
        }

        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .map(|s| s.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "))
        {
            bar.set_style(style);
        }
        bar.set_message(message);
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar: Some(bar) }
    }

    pub fn finish(self) {
        if let Some(bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}

pub fn is_interactive() -> bool {
    std::io::stdout().is_terminal() && std::io::stderr().is_terminal()
}
