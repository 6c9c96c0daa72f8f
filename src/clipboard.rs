//! Clipboard sinks and the transient "copied" indicator.

use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

/// How long the copied indicator stays on after a successful copy.
pub const COPIED_RESET: Duration = Duration::from_millis(2000);

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum ClipboardError {
    #[error("clipboard is unavailable: {0}")]
    Unavailable(#[source] BoxError),

    #[error("failed to write to the clipboard: {0}")]
    Write(#[source] BoxError),
}

/// Somewhere converted code can be copied to.
pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// Whether copied text is served by this process rather than stored by the OS.
///
/// On X11 and Wayland the selection disappears once its owner exits, so a
/// short-lived process has to stay up until another client takes it over.
pub const SELECTION_OWNED_BY_PROCESS: bool = cfg!(all(
    unix,
    not(any(target_os = "macos", target_os = "ios", target_os = "android"))
));

/// The operating system clipboard.
///
/// The underlying context is opened on first use and kept for the lifetime
/// of this value. Keep it alive for as long as the copied text should stay
/// available (see [`SELECTION_OWNED_BY_PROCESS`]).
#[derive(Default)]
pub struct SystemClipboard {
    context: Option<copypasta::ClipboardContext>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.context.is_some()
    }
}

impl std::fmt::Debug for SystemClipboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemClipboard")
            .field("open", &self.is_open())
            .finish()
    }
}

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        use copypasta::{ClipboardContext, ClipboardProvider};

        let context = match self.context.take() {
            Some(context) => context,
            None => ClipboardContext::new().map_err(ClipboardError::Unavailable)?,
        };
        self.context
            .insert(context)
            .set_contents(text.to_owned())
            .map_err(ClipboardError::Write)
    }
}

/// Tracks when the last successful copy happened.
///
/// The flag reads true for [`COPIED_RESET`] after the most recent copy.
/// Copying again restarts the window.
#[derive(Debug, Clone, Default)]
pub struct CopyIndicator {
    copied_at: Option<Instant>,
}

impl CopyIndicator {
    pub fn mark(&mut self) {
        self.copied_at = Some(Instant::now());
    }

    pub fn is_copied(&self) -> bool {
        self.is_copied_at(Instant::now())
    }

    pub fn is_copied_at(&self, now: Instant) -> bool {
        self.copied_at
            .map(|at| now.saturating_duration_since(at) < COPIED_RESET)
            .unwrap_or(false)
    }
}
