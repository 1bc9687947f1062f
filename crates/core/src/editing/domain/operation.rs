use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// What to do with a flagged interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// Obscure every frame in the interval; audio is kept.
    Blur,
    /// Cut the interval (video and audio) out of the output.
    Remove,
}

impl OperationKind {
    /// Case-insensitive lookup of an upstream operation name.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "blur" => Some(OperationKind::Blur),
            "remove" => Some(OperationKind::Remove),
            _ => None,
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Blur => write!(f, "blur"),
            OperationKind::Remove => write!(f, "remove"),
        }
    }
}

/// An upstream moderation verdict exactly as it arrived.
///
/// Both fields are optional so a single bad record never fails
/// deserialization of the whole batch; non-string JSON values are
/// treated as missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawOperation {
    #[serde(default, deserialize_with = "lenient_string")]
    pub timestamp: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub operation: Option<String>,
}

impl RawOperation {
    pub fn new(timestamp: &str, operation: &str) -> Self {
        Self {
            timestamp: Some(timestamp.to_string()),
            operation: Some(operation.to_string()),
        }
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => Some(s),
        _ => None,
    })
}

/// A validated, time-resolved moderation directive.
///
/// `start_frame`/`end_frame` are informational; interval arithmetic
/// always uses the floating-point times.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Operation {
    pub kind: OperationKind,
    pub anchor_timestamp: String,
    pub start_time: f64,
    pub end_time: f64,
    pub start_frame: usize,
    pub end_frame: usize,
}

impl Operation {
    pub fn new(
        kind: OperationKind,
        anchor_timestamp: &str,
        start_time: f64,
        effect_duration: f64,
        fps: f64,
    ) -> Self {
        let end_time = start_time + effect_duration;
        Self {
            kind,
            anchor_timestamp: anchor_timestamp.to_string(),
            start_time,
            end_time,
            start_frame: time_to_frame(start_time, fps),
            end_frame: time_to_frame(end_time, fps),
        }
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Pushes this operation's end out to cover `other`. Never shrinks.
    pub(crate) fn extend_to(&mut self, other: &Operation) {
        if other.end_time > self.end_time {
            self.end_time = other.end_time;
            self.end_frame = other.end_frame;
        }
    }
}

fn time_to_frame(time: f64, fps: f64) -> usize {
    (time * fps).max(0.0) as usize
}
