use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// A stderr progress bar for work over `len` input files.
pub fn file_progress_bar(len: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(len).with_style(bar_style());
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.set_message(message.to_string());
    pb
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{msg} [{bar:30.cyan/blue}] {pos}/{len} ({elapsed})")
        .map(|style| style.progress_chars("=> "))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}
