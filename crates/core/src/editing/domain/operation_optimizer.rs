use super::edit_config::EditConfig;
use super::operation::{Operation, OperationKind};
use super::segment::TIME_EPSILON;

/// Collapses a normalized operation list into a minimal ordered set.
///
/// Single greedy pass after a stable sort by start time:
/// - a blur is never merged; it flushes whatever is accumulated and is
///   emitted on its own
/// - consecutive removes merge while the gap between the accumulated end
///   and the next start is within the merge tolerance (overlaps always
///   merge)
///
/// The output is sorted by start time and is a fixed point: optimizing it
/// again returns it unchanged.
pub struct OperationOptimizer;

impl OperationOptimizer {
    pub fn optimize(operations: &[Operation], config: &EditConfig) -> Vec<Operation> {
        if operations.is_empty() {
            return Vec::new();
        }

        let mut sorted = operations.to_vec();
        sorted.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));

        let tolerance = config.merge_tolerance();
        let mut optimized: Vec<Operation> = Vec::with_capacity(sorted.len());
        let mut current: Option<Operation> = None;

        for op in sorted {
            if op.kind == OperationKind::Blur {
                optimized.extend(current.take());
                optimized.push(op);
                continue;
            }

            // Blurs are emitted immediately, so the accumulator only ever
            // holds a remove.
            current = match current.take() {
                None => Some(op),
                Some(mut acc) => {
                    if op.start_time - acc.end_time <= tolerance + TIME_EPSILON {
                        acc.extend_to(&op);
                        Some(acc)
                    } else {
                        optimized.push(acc);
                        Some(op)
                    }
                }
            };
        }

        optimized.extend(current);

        log::info!(
            "Optimized {} operations into {} operations",
            operations.len(),
            optimized.len()
        );
        optimized
    }
}
