//! Progress reporter implementation
//!
//! Wraps an indicatif byte bar. Transports hand their readers and writers
//! to [`ProgressReporter::wrap_read`] / [`ProgressReporter::wrap_write`]
//! so bytes are counted as they stream.

use indicatif::{MultiProgress, ProgressBar, ProgressBarIter, ProgressDrawTarget, ProgressStyle};
use std::io::{Read, Write};

/// Progress reporter for transfer operations
///
/// Cheap to clone; clones share the same bar. Each transfer takes its own
/// bar from [`for_transfer`](Self::for_transfer), so concurrent transfers
/// never mix their counts.
#[derive(Clone)]
pub struct ProgressReporter {
    bar: ProgressBar,
    multi: MultiProgress,
    enabled: bool,
}

impl ProgressReporter {
    /// Create a visible progress reporter
    ///
    /// The root bar itself stays hidden; bars appear per transfer.
    pub fn new() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            multi: MultiProgress::new(),
            enabled: true,
        }
    }

    /// Create a disabled progress reporter (for quiet mode and library use)
    pub fn disabled() -> Self {
        let bar = ProgressBar::hidden();
        bar.set_draw_target(ProgressDrawTarget::hidden());
        Self {
            bar,
            multi: MultiProgress::with_draw_target(ProgressDrawTarget::hidden()),
            enabled: false,
        }
    }

    /// A separate bar for one transfer, drawn alongside this one
    pub fn for_transfer(&self) -> Self {
        if !self.enabled {
            return Self::disabled();
        }
        Self {
            bar: self.multi.add(styled_bar()),
            multi: self.multi.clone(),
            enabled: true,
        }
    }

    /// Whether the bar is drawn
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Reset the bar for a new transfer; unknown sizes show a spinner-like bar
    pub fn start(&self, total: Option<u64>, label: &str) {
        self.bar.reset();
        self.bar.set_length(total.unwrap_or(0));
        self.bar.set_message(label.to_string());
    }

    /// Count bytes read through `reader`
    pub fn wrap_read<R: Read>(&self, reader: R) -> ProgressBarIter<R> {
        self.bar.wrap_read(reader)
    }

    /// Count bytes written through `writer`
    pub fn wrap_write<W: Write>(&self, writer: W) -> ProgressBarIter<W> {
        self.bar.wrap_write(writer)
    }

    /// Bytes counted since the last [`start`](Self::start)
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Finish the bar with a final message
    pub fn finish(&self, msg: &str) {
        if self.enabled {
            self.bar.finish_with_message(msg.to_string());
        }
    }

    /// Clear the bar without leaving output behind
    pub fn abandon(&self) {
        if self.enabled {
            self.bar.abandon();
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::disabled()
    }
}

fn styled_bar() -> ProgressBar {
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40.green/white}] {bytes}/{total_bytes} ({bytes_per_sec}, ETA {eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    bar
}

impl std::fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("enabled", &self.enabled)
            .field("position", &self.bar.position())
            .finish()
    }
}
