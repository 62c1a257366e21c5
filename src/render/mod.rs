//! View rendering.
//!
//! A [`ViewRenderer`] buffers views and writes them all at once when
//! flushed. Flushing consumes the renderer, so a buffer is written at most
//! once.

mod json;
mod table;

pub use json::JsonRenderer;
pub use table::{TableOptions, TableRenderer};

use crate::error::Result;
use crate::views::View;

/// Sink for rendered views.
pub trait ViewRenderer {
    /// What the renderer hands back once flushed (usually its writer).
    type Output;

    /// Buffers a view.
    fn append(&mut self, view: View);

    /// Writes every buffered view, in append order.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be written.
    fn flush(self) -> Result<Self::Output>;
}

/// Truncates `text` to `max` characters, ending in `...`. `0` disables.
#[must_use]
pub fn truncate(text: &str, max: usize) -> String {
    if max == 0 || text.chars().count() <= max {
        return text.to_string();
    }
    if max <= 3 {
        return text.chars().take(max).collect();
    }
    let mut out: String = text.chars().take(max - 3).collect();
    out.push_str("...");
    out
}
