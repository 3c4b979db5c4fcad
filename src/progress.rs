use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Running step: yellow braille spinner, then the step message.
pub fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("\x1b[33m{spinner}\x1b[0m {wide_msg}")
        .unwrap()
        .tick_strings(&["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"])
}

/// Finished step.
pub fn ok_style() -> ProgressStyle {
    ProgressStyle::with_template("\x1b[32m✔\x1b[0m {wide_msg}").unwrap()
}

/// Failed step. The error itself is printed once, by `main`.
pub fn err_style() -> ProgressStyle {
    ProgressStyle::with_template("\x1b[31m✘\x1b[0m {wide_msg}").unwrap()
}

/// Start a spinner for one slow step.
///
/// With `hidden` set (debug logging on) nothing is drawn, so the spinner
/// does not fight with log lines on stderr.
pub fn start(message: String, hidden: bool) -> ProgressBar {
    let pb = if hidden {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    pb.set_style(spinner_style());
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Finish `pb` with `done` on success; on failure keep the running message
/// under the err style.
pub fn finish<T>(pb: &ProgressBar, res: &anyhow::Result<T>, done: String) {
    if res.is_ok() {
        pb.set_style(ok_style());
        pb.finish_with_message(done);
    } else {
        pb.set_style(err_style());
        pb.finish();
    }
}
