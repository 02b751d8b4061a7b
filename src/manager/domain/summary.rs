//! Read-only view of a registered backend.

use super::{BackendId, BackendKind, BackendLabel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Registration metadata of one backend.
///
/// Summaries never expose the backend implementation or its pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerSummary {
    /// Registered identifier.
    pub id: BackendId,
    /// Display label.
    pub label: BackendLabel,
    /// Origin of the implementation.
    pub kind: BackendKind,
    /// When the backend was registered.
    pub registered_at: DateTime<Utc>,
}
