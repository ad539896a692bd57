//! Progress reporting for CLI

use indicatif::{ProgressBar, ProgressStyle};

/// Progress reporter using indicatif. The total file count isn't known
/// until the source path is resolved (wildcard/directory expansion), so
/// this runs as a spinner for the whole copy rather than a bounded bar.
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    pub fn for_copy() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap(),
        );
        bar.set_message("Copying files off the volume...".to_string());
        bar.enable_steady_tick(std::time::Duration::from_millis(100));
        Self { bar }
    }

    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}
