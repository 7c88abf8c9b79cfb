use std::time::Duration;

use gtk4::glib;
use gtk4::prelude::*;

/// A lazy, finite, restartable sequence of characters over an
/// already-received answer string. Purely the producer half of the
/// reveal effect; timing and widget writes live in `start_reveal`.
pub struct Typewriter {
    chars: Vec<char>,
    cursor: usize,
    revealed: String,
}

impl Typewriter {
    pub fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            cursor: 0,
            revealed: String::with_capacity(text.len()),
        }
    }

    /// Advance by one character, or `None` once the text is exhausted.
    pub fn next_char(&mut self) -> Option<char> {
        let ch = *self.chars.get(self.cursor)?;
        self.cursor += 1;
        self.revealed.push(ch);
        Some(ch)
    }

    /// The prefix revealed so far.
    pub fn revealed(&self) -> &str {
        &self.revealed
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.chars.len()
    }

    /// Rewind to the beginning without losing the source text.
    pub fn restart(&mut self) {
        self.cursor = 0;
        self.revealed.clear();
    }
}

/// Reveal `text` into `label`, one character per `interval` tick. The
/// returned `SourceId` is the cancellation token: removing it stops the
/// chain and no further write touches the label. `on_done` runs exactly
/// once, on the tick after the last character, when the reveal ends
/// naturally.
pub fn start_reveal<F>(
    label: &gtk4::Label,
    text: &str,
    interval: Duration,
    on_done: F,
) -> glib::SourceId
where
    F: FnOnce() + 'static,
{
    let label = label.clone();
    let mut writer = Typewriter::new(text);
    let mut on_done = Some(on_done);

    glib::timeout_add_local(interval, move || match writer.next_char() {
        Some(_) => {
            label.set_text(writer.revealed());
            glib::ControlFlow::Continue
        }
        None => {
            if let Some(done) = on_done.take() {
                done();
            }
            glib::ControlFlow::Break
        }
    })
}
