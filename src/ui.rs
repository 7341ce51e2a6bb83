// Console helpers: spinners shown while waiting on the network.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Start a ticking spinner with `msg`. It draws to stderr and stays hidden
/// when stderr is not a terminal.
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Run `f` with a spinner on screen, clearing it whatever the outcome.
pub fn with_spinner<T>(msg: &str, f: impl FnOnce() -> T) -> T {
    let pb = spinner(msg);
    let out = f();
    pb.finish_and_clear();
    out
}
