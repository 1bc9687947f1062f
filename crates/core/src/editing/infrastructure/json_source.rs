use std::path::Path;

use serde_json::Value;

use crate::editing::domain::edit_config::EditConfig;
use crate::editing::domain::edit_error::EditError;
use crate::editing::domain::operation::RawOperation;

/// Loads upstream verdicts from a JSON array of
/// `{"timestamp": "...", "operation": "..."}` objects.
///
/// Entries that are not objects load as empty records, so the normalizer
/// reports them individually instead of failing the batch here.
pub fn load_operations(path: &Path) -> Result<Vec<RawOperation>, EditError> {
    let source_error = |message: String| EditError::OperationSource {
        path: path.to_path_buf(),
        message,
    };

    let text = std::fs::read_to_string(path).map_err(|e| source_error(e.to_string()))?;
    let value: Value = serde_json::from_str(&text).map_err(|e| source_error(e.to_string()))?;
    let Value::Array(entries) = value else {
        return Err(source_error("expected a JSON array of operations".to_string()));
    };

    let operations = entries
        .into_iter()
        .map(|entry| {
            if entry.is_object() {
                serde_json::from_value(entry).unwrap_or_default()
            } else {
                RawOperation::default()
            }
        })
        .collect::<Vec<_>>();

    log::info!(
        "Loaded {} operations from {}",
        operations.len(),
        path.display()
    );
    Ok(operations)
}

/// Loads an [`EditConfig`]. Missing fields take their defaults; the result
/// is validated before it is returned.
pub fn load_config(path: &Path) -> Result<EditConfig, EditError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| EditError::InvalidConfig(format!("{}: {e}", path.display())))?;
    let config: EditConfig = serde_json::from_str(&text)
        .map_err(|e| EditError::InvalidConfig(format!("{}: {e}", path.display())))?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_loads_operations_in_order() {
        let file = write_temp(
            r#"[
                {"timestamp": "00:00:05", "operation": "blur"},
                {"timestamp": "00:00:01.5", "operation": "remove"}
            ]"#,
        );
        let ops = load_operations(file.path()).unwrap();
        assert_eq!(
            ops,
            vec![
                RawOperation::new("00:00:05", "blur"),
                RawOperation::new("00:00:01.5", "remove"),
            ]
        );
    }

    #[test]
    fn test_non_object_entries_load_as_empty_records() {
        let file = write_temp(r#"[42, {"operation": "delete"}, "x"]"#);
        let ops = load_operations(file.path()).unwrap();
        assert_eq!(ops.len(), 3);
        assert_eq!(ops[0], RawOperation::default());
        assert_eq!(ops[1].operation.as_deref(), Some("delete"));
        assert_eq!(ops[1].timestamp, None);
        assert_eq!(ops[2], RawOperation::default());
    }

    #[test]
    fn test_empty_array_is_valid() {
        let file = write_temp("[]");
        assert!(load_operations(file.path()).unwrap().is_empty());
    }

    #[test]
    fn test_non_array_is_source_error() {
        let file = write_temp(r#"{"timestamp": "00:00:05"}"#);
        let err = load_operations(file.path()).unwrap_err();
        assert!(matches!(err, EditError::OperationSource { .. }));
    }

    #[test]
    fn test_invalid_json_is_source_error() {
        let file = write_temp("[{");
        assert!(matches!(
            load_operations(file.path()),
            Err(EditError::OperationSource { .. })
        ));
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = load_operations(Path::new("/nonexistent/verdicts.json")).unwrap_err();
        match err {
            EditError::OperationSource { path, .. } => {
                assert_eq!(path, Path::new("/nonexistent/verdicts.json"));
            }
            other => panic!("expected operation source error, got {other:?}"),
        }
    }

    #[test]
    fn test_config_fills_defaults() {
        let file = write_temp(r#"{"effect_duration": 2.0}"#);
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.effect_duration, 2.0);
        assert_eq!(config.target_fps, EditConfig::default().target_fps);
    }

    #[test]
    fn test_config_is_validated() {
        let file = write_temp(r#"{"target_fps": 0}"#);
        assert!(matches!(
            load_config(file.path()),
            Err(EditError::InvalidConfig(_))
        ));
    }
}
