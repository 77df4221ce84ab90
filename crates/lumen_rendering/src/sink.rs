//! Display sink interface.

use lumen_ui::Color;

use crate::draw::DrawEntry;

/// Receives finished frames.
///
/// `entries` is a snapshot owned by the consumer; a sink must not keep the
/// slice past the call. Failures are the sink's own business.
pub trait DisplaySink {
    /// Draws one frame: clear to `background`, then every entry in order.
    fn draw(&mut self, entries: &[DrawEntry], background: Color);
}

impl<F> DisplaySink for F
where
    F: FnMut(&[DrawEntry], Color),
{
    fn draw(&mut self, entries: &[DrawEntry], background: Color) {
        self(entries, background);
    }
}

/// Sink that keeps counters only. Useful for headless runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountingSink {
    /// Frames received.
    pub frames: u64,
    /// Entries in the last frame.
    pub last_len: usize,
}

impl DisplaySink for CountingSink {
    fn draw(&mut self, entries: &[DrawEntry], _background: Color) {
        self.frames += 1;
        self.last_len = entries.len();
    }
}
