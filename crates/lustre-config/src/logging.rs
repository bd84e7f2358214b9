use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How step lifecycle events are rendered.
///
/// Parsed case-insensitively from `json` or `compact`, so `--log-format`
/// and `LUSTRE_LOG_FORMAT` accept either spelling.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One JSON object per event, with the event fields flattened.
    #[default]
    Json,
    /// One terse line per event, for a developer watching a terminal.
    Compact,
}

impl LogFormat {
    /// Returns `true` for machine-readable output, which never carries
    /// terminal colour codes.
    #[must_use]
    pub const fn is_structured(self) -> bool {
        matches!(self, Self::Json)
    }
}
