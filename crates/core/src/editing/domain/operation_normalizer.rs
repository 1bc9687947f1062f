use super::edit_config::EditConfig;
use super::edit_error::EditError;
use super::operation::{Operation, OperationKind, RawOperation};
use super::timestamp::parse_timestamp;

/// Result of normalizing one batch of upstream verdicts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedOperations {
    /// Accepted operations, in input order.
    pub operations: Vec<Operation>,
    /// Skipped entries. Every error here is recoverable.
    pub rejected: Vec<EditError>,
}

/// Validates raw verdicts and resolves them onto the timeline.
pub struct OperationNormalizer;

impl OperationNormalizer {
    /// Converts raw `(timestamp, operation)` records into [`Operation`]s.
    ///
    /// Missing fields and unknown kinds skip the entry with a warning. An
    /// unparsable timestamp fails the whole batch: it means the verdict
    /// producer broke its contract.
    pub fn normalize(
        raw: &[RawOperation],
        config: &EditConfig,
    ) -> Result<NormalizedOperations, EditError> {
        let mut result = NormalizedOperations::default();

        for (index, entry) in raw.iter().enumerate() {
            match Self::normalize_one(index, entry, config) {
                Ok(op) => result.operations.push(op),
                Err(e) if e.is_recoverable() => {
                    log::warn!("Skipping operation: {e}");
                    result.rejected.push(e);
                }
                Err(e) => return Err(e),
            }
        }

        log::info!(
            "Normalized {} of {} operations ({} skipped)",
            result.operations.len(),
            raw.len(),
            result.rejected.len()
        );
        Ok(result)
    }

    fn normalize_one(
        index: usize,
        entry: &RawOperation,
        config: &EditConfig,
    ) -> Result<Operation, EditError> {
        let timestamp = present(entry.timestamp.as_deref()).ok_or_else(|| {
            EditError::MalformedOperation {
                index,
                reason: "missing timestamp".to_string(),
            }
        })?;
        let name = present(entry.operation.as_deref()).ok_or_else(|| {
            EditError::MalformedOperation {
                index,
                reason: "missing operation".to_string(),
            }
        })?;

        let kind = OperationKind::parse(name).ok_or_else(|| EditError::UnknownOperationKind {
            index,
            kind: name.to_string(),
        })?;

        let start_time = parse_timestamp(timestamp)?;

        Ok(Operation::new(
            kind,
            timestamp,
            start_time,
            config.effect_duration,
            config.target_fps,
        ))
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
