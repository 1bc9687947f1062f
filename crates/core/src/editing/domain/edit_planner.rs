use serde::Serialize;

use super::edit_config::EditConfig;
use super::edit_error::EditError;
use super::operation::{Operation, RawOperation};
use super::operation_normalizer::{NormalizedOperations, OperationNormalizer};
use super::operation_optimizer::OperationOptimizer;
use super::segment::{EditPlan, Timeline};
use super::segment_builder::SegmentBuilder;

/// Everything the planning stages produced for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedEdit {
    pub normalized: NormalizedOperations,
    pub optimized: Vec<Operation>,
    pub plan: EditPlan,
}

/// Serializable view of a [`PlannedEdit`] for `--plan-only` output.
#[derive(Debug, Serialize)]
pub struct PlanSummary<'a> {
    pub timeline: Timeline,
    pub accepted: usize,
    pub rejected: Vec<String>,
    pub operations: &'a [Operation],
    pub plan: &'a EditPlan,
}

impl PlannedEdit {
    pub fn summary(&self, timeline: Timeline) -> PlanSummary<'_> {
        PlanSummary {
            timeline,
            accepted: self.normalized.operations.len(),
            rejected: self.normalized.rejected.iter().map(|e| e.to_string()).collect(),
            operations: &self.optimized,
            plan: &self.plan,
        }
    }
}

/// Runs normalize, optimize and segment building over one batch.
///
/// Pure: no I/O, so the same input always yields the same plan.
pub fn plan_edit(
    raw: &[RawOperation],
    timeline: &Timeline,
    config: &EditConfig,
) -> Result<PlannedEdit, EditError> {
    config.validate()?;

    let normalized = OperationNormalizer::normalize(raw, config)?;
    let optimized = OperationOptimizer::optimize(&normalized.operations, config);
    let plan = SegmentBuilder::build(timeline, &optimized, config);

    log::info!(
        "Planned {} segments ({} blurred), keeping {:.3}s of {:.3}s",
        plan.segments.len(),
        plan.transform_count(),
        plan.kept_duration(),
        plan.duration
    );

    Ok(PlannedEdit {
        normalized,
        optimized,
        plan,
    })
}
