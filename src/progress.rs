//! Progress bar display for the injection pipeline

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::injector::Stage;

/// One bar that advances as the pipeline moves through its stages
pub struct StageProgress {
    pb: ProgressBar,
    started: u64,
}

impl StageProgress {
    /// Create a progress display; `visible == false` draws nothing
    pub fn new(visible: bool) -> Self {
        let pb = ProgressBar::with_draw_target(
            Some(Stage::ALL.len() as u64),
            if visible {
                ProgressDrawTarget::stderr()
            } else {
                ProgressDrawTarget::hidden()
            },
        );

        if let Ok(style) = ProgressStyle::default_bar().template("[{bar:30.cyan/blue}] {pos}/{len} {msg}") {
            pb.set_style(style.progress_chars("#>-"));
        }

        Self { pb, started: 0 }
    }

    /// Mark the previous stage done and show `stage` as running
    pub fn stage(&mut self, stage: Stage) {
        if self.started > 0 {
            self.pb.inc(1);
        }
        self.started += 1;
        self.pb.set_message(stage.to_string());
    }

    /// Finish after the last stage succeeded
    pub fn finish(&self) {
        self.pb.set_position(Stage::ALL.len() as u64);
        self.pb.finish_and_clear();
    }

    /// Abandon on error, leaving the failed stage on screen
    pub fn abandon(&self) {
        self.pb.abandon();
    }

    #[cfg(test)]
    fn position(&self) -> u64 {
        self.pb.position()
    }
}
