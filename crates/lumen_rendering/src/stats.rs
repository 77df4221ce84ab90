//! Per-prepare statistics.

/// What one `prepare` pass produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Frames prepared so far, this one included.
    pub frame: u64,
    /// Length of the draw list after the pass.
    pub entries: u32,
    /// True when the pass drew the placeholder because no world was attached.
    pub placeholder: bool,
    /// World objects that passed the view check.
    pub world_drawn: u32,
    /// World objects rejected by the view check.
    pub world_culled: u32,
    /// Entries contributed by the node tree.
    pub node_entries: u32,
    /// Entries parked in the pool after the pass.
    pub pooled: u32,
    /// Entries built by the pool over its lifetime.
    pub pool_created: u32,
}

impl RenderStats {
    /// Fraction of world objects rejected, 0 when there were none.
    #[must_use]
    pub fn cull_ratio(&self) -> f32 {
        let total = self.world_drawn + self.world_culled;
        if total == 0 {
            0.0
        } else {
            #[allow(clippy::cast_precision_loss)]
            let ratio = self.world_culled as f32 / total as f32;
            ratio
        }
    }
}
