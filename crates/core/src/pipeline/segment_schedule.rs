use std::ops::Range;

use crate::editing::domain::segment::EditPlan;

/// What happens to one normalized frame slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotRoute {
    /// Kept as output frame `position`, rendered for plan segment `segment`.
    Keep { segment: usize, position: usize },
    /// Falls in a removed span.
    Drop,
    /// Past the last kept segment; nothing further is needed.
    Done,
}

/// Maps increasing frame slots at the output rate onto the plan's
/// segments, numbering kept frames consecutively.
pub struct SegmentSchedule {
    ranges: Vec<(usize, Range<usize>)>,
    cursor: usize,
    emitted: usize,
}

impl SegmentSchedule {
    pub fn new(plan: &EditPlan, fps: f64) -> Self {
        let ranges = plan
            .segments
            .iter()
            .enumerate()
            .map(|(i, s)| (i, s.frame_range(fps)))
            .filter(|(_, r)| !r.is_empty())
            .collect();
        Self {
            ranges,
            cursor: 0,
            emitted: 0,
        }
    }

    /// Output frames the plan produces.
    pub fn total_frames(&self) -> usize {
        self.ranges.iter().map(|(_, r)| r.len()).sum()
    }

    /// Routes `slot`. Slots must be passed in increasing order.
    pub fn route(&mut self, slot: usize) -> SlotRoute {
        while let Some((_, range)) = self.ranges.get(self.cursor) {
            if slot < range.end {
                break;
            }
            self.cursor += 1;
        }

        match self.ranges.get(self.cursor) {
            None => SlotRoute::Done,
            Some((_, range)) if slot < range.start => SlotRoute::Drop,
            Some((segment, _)) => {
                let position = self.emitted;
                self.emitted += 1;
                SlotRoute::Keep {
                    segment: *segment,
                    position,
                }
            }
        }
    }
}
