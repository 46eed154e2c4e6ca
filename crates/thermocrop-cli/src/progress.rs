use indicatif::{ProgressBar, ProgressStyle};
use thermocrop_core::pipeline::{PipelineStage, ProgressReporter};

/// Drives an indicatif bar from analysis progress events.
///
/// Stages with a known item count show a bar; others only update the
/// message.
pub struct BarReporter {
    bar: ProgressBar,
}

impl BarReporter {
    pub fn new() -> Self {
        Self {
            bar: ProgressBar::new(0),
        }
    }

    pub fn finish(&self, message: &'static str) {
        self.bar.finish_with_message(message);
    }
}

impl ProgressReporter for BarReporter {
    fn begin_stage(&self, stage: PipelineStage, total_items: Option<usize>) {
        let template = if total_items.is_some() {
            "{msg:28} [{bar:40}] {pos}/{len}"
        } else {
            "{msg:28}"
        };
        if let Ok(style) = ProgressStyle::default_bar().template(template) {
            self.bar.set_style(style.progress_chars("=> "));
        }
        self.bar.set_length(total_items.unwrap_or(0) as u64);
        self.bar.set_position(0);
        self.bar.set_message(stage.to_string());
    }

    fn advance(&self, items_done: usize) {
        self.bar.set_position(items_done as u64);
    }
}
