use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::Duration;

/// Chunk-read progress for one variable.
///
/// Lines are printed above the bar while it is drawn. When the bar is hidden
/// (stderr is not a terminal, e.g. a redirected batch job) they go straight to
/// the line output instead, stdout unless replaced with [`Self::with_output`].
pub struct ProgressReporter {
    progress_bar: Option<ProgressBar>,
    output: Mutex<Box<dyn Write + Send>>,
    silent: bool,
}

impl ProgressReporter {
    pub fn new(total: u64, message: &str, silent: bool) -> Self {
        if silent {
            return Self::silent();
        }

        Self {
            progress_bar: Some(styled_bar(ProgressBar::new(total), message)),
            output: Mutex::new(Box::new(io::stdout())),
            silent: false,
        }
    }

    /// Hidden bar that only counts; every line is written to `output`
    pub fn with_output(total: u64, message: &str, output: impl Write + Send + 'static) -> Self {
        let pb = ProgressBar::with_draw_target(Some(total), ProgressDrawTarget::hidden());
        Self {
            progress_bar: Some(styled_bar(pb, message)),
            output: Mutex::new(Box::new(output)),
            silent: false,
        }
    }

    pub fn silent() -> Self {
        Self {
            progress_bar: None,
            output: Mutex::new(Box::new(io::sink())),
            silent: true,
        }
    }

    pub fn position(&self) -> u64 {
        self.progress_bar.as_ref().map_or(0, |pb| pb.position())
    }

    pub fn increment(&self, delta: u64) {
        if let Some(ref pb) = self.progress_bar {
            pb.inc(delta);
        }
    }

    pub fn set_message(&self, message: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.set_message(message.to_string());
        }
    }

    pub fn finish_with_message(&self, message: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_with_message(message.to_string());
        }
    }

    pub fn println(&self, message: &str) {
        if self.silent {
            return;
        }

        match self.progress_bar {
            Some(ref pb) if !pb.is_hidden() => pb.println(message),
            _ => self.write_line(message),
        }
    }

    fn write_line(&self, message: &str) {
        if let Ok(mut output) = self.output.lock() {
            // Progress lines are best effort; a closed pipe must not fail the run
            let _ = writeln!(output, "{}", message);
        }
    }
}

fn styled_bar(pb: ProgressBar, message: &str) -> ProgressBar {
    let style = ProgressStyle::default_bar()
        .template("{msg}\n{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        if let Some(ref pb) = self.progress_bar {
            if !pb.is_finished() {
                pb.finish_and_clear();
            }
        }
    }
}
