use crate::ui::theme;
use crate::ui::Icons;
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::time::{Duration, Instant};

/// Row counter for test data generation. Hidden when stdout is not a terminal.
pub struct GenerationProgress {
    pb: ProgressBar,
    started: Instant,
}

impl GenerationProgress {
    pub fn new(total: usize) -> Self {
        let pb = if console::Term::stdout().is_term() {
            let pb = ProgressBar::new(total as u64).with_message("Inserting records");
            if let Ok(style) = ProgressStyle::with_template(
                "{spinner:.green} {msg} [{bar:40.cyan/blue}] {human_pos}/{human_len} ({eta})",
            ) {
                pb.set_style(style.progress_chars("=> "));
            }
            pb
        } else {
            ProgressBar::hidden()
        };
        Self { pb, started: Instant::now() }
    }

    pub fn inc(&self, rows: usize) {
        self.pb.inc(rows as u64);
    }

    pub fn finish(&self, total: usize) {
        self.pb.finish_and_clear();
        println!(
            "{} {}",
            Icons::CHECK,
            format!(
                "Inserted {} records in {}",
                total,
                HumanDuration(self.started.elapsed())
            )
            .style(theme().success.clone())
        );
    }

    pub fn abandon(&self) {
        self.pb.abandon();
    }
}

pub struct Spinner {
    pb: ProgressBar,
}

impl Spinner {
    pub fn new(message: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_message(message.to_string());
        if console::Term::stdout().is_term() {
            pb.enable_steady_tick(Duration::from_millis(100));
        } else {
            pb.set_draw_target(indicatif::ProgressDrawTarget::hidden());
        }
        Self { pb }
    }

    pub fn finish_and_clear(&self) {
        self.pb.finish_and_clear();
    }
}
