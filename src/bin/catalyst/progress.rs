//! Spinner for long-running package manager calls.

use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// A spinner on stderr that stays hidden in verbose or JSON mode and when
/// stderr is not a terminal.
pub struct Spinner {
    pb: Option<ProgressBar>,
}

impl Spinner {
    pub fn start(message: impl Into<String>, hidden: bool) -> Self {
        if hidden || !std::io::stderr().is_terminal() {
            return Spinner { pb: None };
        }

        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        pb.set_style(style);
        pb.set_message(message.into());
        pb.enable_steady_tick(Duration::from_millis(100));

        Spinner { pb: Some(pb) }
    }

    pub fn finish(self) {
        if let Some(pb) = self.pb {
            pb.finish_and_clear();
        }
    }
}
