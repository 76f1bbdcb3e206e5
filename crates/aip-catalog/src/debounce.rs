//! Debounce for the free-text search box. Keystrokes only reach the filter
//! state once typing has paused for [`SEARCH_DEBOUNCE`].

use std::time::Duration;

use tokio::time::Instant;

pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
pub struct SearchDebounce {
    delay: Duration,
    pending: Option<(String, Instant)>,
}

impl Default for SearchDebounce {
    fn default() -> Self {
        Self::new(SEARCH_DEBOUNCE)
    }
}

impl SearchDebounce {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Records new input at `now`, restarting the quiet period.
    pub fn push(&mut self, text: impl Into<String>, now: Instant) {
        self.pending = Some((text.into(), now + self.delay));
    }

    /// When the pending input becomes due, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, due)| *due)
    }

    /// Takes the pending input if its quiet period has elapsed by `now`.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match &self.pending {
            Some((_, due)) if *due <= now => self.pending.take().map(|(text, _)| text),
            _ => None,
        }
    }

    /// Waits out the quiet period and returns the settled input, or `None`
    /// immediately when nothing is pending.
    pub async fn settled(&mut self) -> Option<String> {
        let due = self.deadline()?;
        tokio::time::sleep_until(due).await;
        self.poll(Instant::now())
    }
}
