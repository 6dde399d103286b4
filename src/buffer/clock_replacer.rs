use crate::buffer::replace::Replacer;
use crate::FrameId;

#[derive(Copy, Clone, Default)]
struct ClockFrame {
    evictable: bool,
    referenced: bool,
}

// Second-chance replacement: the hand sweeps the frames, clearing reference
// bits, and evicts the first evictable frame whose bit is already clear.
pub struct ClockReplacer {
    frames: Vec<ClockFrame>,
    hand: usize,
    size: usize,
}

impl ClockReplacer {
    pub fn new(num_pages: usize) -> Self {
        Self {
            frames: vec![ClockFrame::default(); num_pages],
            hand: 0,
            size: 0,
        }
    }
}

impl Replacer for ClockReplacer {
    fn victim(&mut self) -> Option<FrameId> {
        if self.size == 0 {
            return None;
        }
        loop {
            let frame_id = self.hand;
            self.hand = (self.hand + 1) % self.frames.len();

            let frame = &mut self.frames[frame_id];
            if !frame.evictable {
                continue;
            }
            if frame.referenced {
                frame.referenced = false;
            } else {
                frame.evictable = false;
                self.size -= 1;
                return Some(frame_id as FrameId);
            }
        }
    }

    fn pin(&mut self, frame_id: FrameId) {
        if let Some(frame) = self.frames.get_mut(frame_id as usize) {
            if frame.evictable {
                frame.evictable = false;
                self.size -= 1;
            }
        }
    }

    fn unpin(&mut self, frame_id: FrameId) {
        if let Some(frame) = self.frames.get_mut(frame_id as usize) {
            if !frame.evictable {
                frame.evictable = true;
                frame.referenced = true;
                self.size += 1;
            }
        }
    }

    fn size(&self) -> usize {
        self.size
    }
}
