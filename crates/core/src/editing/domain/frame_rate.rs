use crate::shared::frame::Frame;

/// Resamples a decoded frame stream to a constant output frame rate.
///
/// Output slot `n` is shown at `n / target_fps` and carries the latest
/// source frame shown at or before that instant, so frames are duplicated
/// when upsampling and dropped when downsampling. Emitted frames are
/// renumbered with their slot index. Errors from the source pass through
/// unchanged.
pub struct FrameRateNormalizer<I> {
    source: I,
    /// Source frames per output slot.
    step: f64,
    next_slot: usize,
    current: Option<Frame>,
    /// Source position of `current` (or of the frame last taken from it).
    current_pos: Option<usize>,
    source_pos: usize,
    done: bool,
}

impl<I, E> FrameRateNormalizer<I>
where
    I: Iterator<Item = Result<Frame, E>>,
{
    /// A non-positive or non-finite `source_fps` is taken to already match
    /// the target.
    pub fn new(source: I, source_fps: f64, target_fps: f64) -> Self {
        let step = if source_fps.is_finite() && source_fps > 0.0 && target_fps > 0.0 {
            source_fps / target_fps
        } else {
            1.0
        };
        Self {
            source,
            step,
            next_slot: 0,
            current: None,
            current_pos: None,
            source_pos: 0,
            done: false,
        }
    }

    fn source_index(&self, slot: usize) -> usize {
        (slot as f64 * self.step + 1e-9).floor() as usize
    }
}

impl<I, E> Iterator for FrameRateNormalizer<I>
where
    I: Iterator<Item = Result<Frame, E>>,
{
    type Item = Result<Frame, E>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let wanted = self.source_index(self.next_slot);
        while self.current_pos.map_or(true, |pos| pos < wanted) {
            match self.source.next() {
                Some(Ok(frame)) => {
                    self.current = Some(frame);
                    self.current_pos = Some(self.source_pos);
                    self.source_pos += 1;
                }
                Some(Err(e)) => return Some(Err(e)),
                None => {
                    self.done = true;
                    return None;
                }
            }
        }

        let slot = self.next_slot;
        self.next_slot += 1;
        let reused = self.source_index(self.next_slot) == wanted;

        let frame = if reused {
            self.current.clone()
        } else {
            self.current.take()
        };
        match frame {
            Some(frame) => Some(Ok(frame.with_index(slot))),
            // The source frame was already moved out; cannot happen while
            // source indices are non-decreasing.
            None => {
                self.done = true;
                None
            }
        }
    }
}
