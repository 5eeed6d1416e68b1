//! Checkpoint - Render Snapshot and Digests
//!
//! `OfficeSnapshot` is the read-only view a render layer draws from: the
//! camera transform, the meeting signals and one `AgentView` per agent.
//!
//! # Critical Invariants
//!
//! - **Determinism**: Same seed + config + input sequence produces identical
//!   snapshots, and therefore identical digests
//! - **Config Matching**: `config_hash` is stable across key ordering, so two
//!   runs can be compared before their snapshots are

use crate::core::geometry::Point;
use crate::models::agent::Facing;
use crate::orchestrator::engine::SimulationError;
use crate::orchestrator::meeting::MeetingPhase;
use crate::viewport::ViewportState;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

// ============================================================================
// Snapshot Structures
// ============================================================================

/// Everything a frame needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfficeSnapshot {
    /// Tick counter at the time of the snapshot
    pub tick: u64,

    /// Simulated milliseconds elapsed
    pub time_ms: u64,

    /// Camera transform
    pub viewport: ViewportState,

    /// True during both meeting fades
    pub input_suspended: bool,

    /// True whenever a meeting is in progress (any phase but Idle)
    pub meeting_active: bool,

    pub phase: MeetingPhase,

    /// All agents, in spawn order
    pub agents: Vec<AgentView>,
}

/// Per-agent render state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentView {
    pub id: String,
    pub name: String,
    pub color: String,
    pub position: Point,
    pub target: Point,
    pub facing: Facing,
    pub is_wobbling: bool,
    pub is_walking: bool,
    pub forced_target: Option<Point>,
    /// Meeting reaction bubble, while the meeting holds
    pub reaction: Option<String>,
    /// Latest chat reply
    pub chat_line: Option<String>,
    /// State tags from chat turns, sorted
    pub tags: Vec<String>,
    /// Thought bubble text
    pub active_thought: Option<String>,
    /// A chat turn is waiting on its reply
    pub is_thinking: bool,
    /// Selected in the UI
    pub is_active: bool,
}

impl OfficeSnapshot {
    pub fn agent(&self, agent_id: &str) -> Option<&AgentView> {
        self.agents.iter().find(|a| a.id == agent_id)
    }
}

// ============================================================================
// Hashing
// ============================================================================

/// Recursively sort object keys for a canonical representation
fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> =
                map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
            Value::Object(sorted.into_iter().collect())
        }
        Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

fn sha256_of_canonical_json<T: Serialize>(value: &T, what: &str) -> Result<String, SimulationError> {
    let value = serde_json::to_value(value).map_err(|e| {
        SimulationError::SerializationError(format!("{} serialization failed: {}", what, e))
    })?;

    let json = serde_json::to_string(&canonicalize(value)).map_err(|e| {
        SimulationError::SerializationError(format!("{} serialization failed: {}", what, e))
    })?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

/// SHA-256 hex digest of a snapshot
///
/// Two runs with the same seed, config and inputs produce the same digest.
pub fn snapshot_digest(snapshot: &OfficeSnapshot) -> Result<String, SimulationError> {
    sha256_of_canonical_json(snapshot, "Snapshot")
}

/// Compute deterministic SHA-256 hash of a config
pub fn config_hash<T: Serialize>(config: &T) -> Result<String, SimulationError> {
    sha256_of_canonical_json(config, "Config")
}
