use crate::FrameId;

/// Picks which unpinned buffer frame to reuse when the pool is full.
pub trait Replacer {
    /// Removes and returns the frame to evict, `None` if every frame is pinned.
    fn victim(&mut self) -> Option<FrameId>;
    /// The frame is in use and must not be evicted.
    fn pin(&mut self, frame_id: FrameId);
    /// The frame may be evicted again.
    fn unpin(&mut self, frame_id: FrameId);
    /// Number of evictable frames.
    fn size(&self) -> usize;
}
