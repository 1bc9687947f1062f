use super::edit_config::EditConfig;
use super::operation::{Operation, OperationKind};
use super::segment::{EditPlan, Segment, SegmentKind, TimeSpan, Timeline, TIME_EPSILON};
use super::timestamp::format_timestamp;

/// Walks the timeline with a cursor and turns an optimized operation list
/// into an [`EditPlan`].
///
/// Gaps longer than the segment threshold become pass-through segments.
/// Shorter gaps are cut along with the neighbouring operation, so the plan
/// never contains sub-threshold slivers and still tiles `[0, duration]`.
/// Operations that overlap the cursor are clipped to start at it; an
/// operation that ends before the cursor contributes nothing.
pub struct SegmentBuilder;

impl SegmentBuilder {
    pub fn build(timeline: &Timeline, operations: &[Operation], config: &EditConfig) -> EditPlan {
        let duration = timeline.duration.max(0.0);
        let mut plan = EditPlan {
            duration,
            segments: Vec::new(),
            removed: Vec::new(),
        };

        if operations.is_empty() {
            if duration > 0.0 {
                plan.segments
                    .push(Segment::new(SegmentKind::PassThrough, 0.0, duration));
            }
            log::debug!("No operations: single pass-through segment 0.000s - {duration:.3}s");
            return plan;
        }

        let threshold = config.segment_threshold();
        let mut cursor = 0.0_f64;

        for op in operations {
            if op.start_time >= duration {
                log::warn!(
                    "Ignoring {} at {:.3}s: starts at or after the end of the media ({duration:.3}s)",
                    op.kind,
                    op.start_time
                );
                continue;
            }

            let end = op.end_time.min(duration);
            if end <= cursor + TIME_EPSILON {
                log::debug!(
                    "Skipping {} {:.3}s - {:.3}s: already covered",
                    op.kind,
                    op.start_time,
                    op.end_time
                );
                continue;
            }

            let mut start = op.start_time.max(cursor);
            if start - cursor < TIME_EPSILON {
                start = cursor;
            }
            if cursor < op.start_time - threshold {
                push_segment(&mut plan, SegmentKind::PassThrough, cursor, start);
            } else if start > cursor {
                push_removed(&mut plan, cursor, start);
            }

            match op.kind {
                OperationKind::Blur => push_segment(&mut plan, SegmentKind::Transform, start, end),
                OperationKind::Remove => push_removed(&mut plan, start, end),
            }
            cursor = end;
        }

        if cursor < duration - threshold {
            push_segment(&mut plan, SegmentKind::PassThrough, cursor, duration);
        } else if cursor < duration {
            push_removed(&mut plan, cursor, duration);
        }

        if plan.is_fully_removed() {
            log::info!("No segments to process - all content was removed");
        }
        plan
    }
}

fn push_segment(plan: &mut EditPlan, kind: SegmentKind, start: f64, end: f64) {
    match kind {
        SegmentKind::PassThrough => log::debug!(
            "Added normal segment: {} - {}",
            format_timestamp(start),
            format_timestamp(end)
        ),
        SegmentKind::Transform => log::debug!(
            "Added blur segment: {} - {}",
            format_timestamp(start),
            format_timestamp(end)
        ),
    }
    plan.segments.push(Segment::new(kind, start, end));
}

/// Records a cut, coalescing with the previous cut when they touch.
fn push_removed(plan: &mut EditPlan, start: f64, end: f64) {
    log::debug!(
        "Removing segment: {} - {}",
        format_timestamp(start),
        format_timestamp(end)
    );
    if let Some(last) = plan.removed.last_mut() {
        if (last.end - start).abs() < TIME_EPSILON {
            last.end = end;
            return;
        }
    }
    plan.removed.push(TimeSpan::new(start, end));
}
