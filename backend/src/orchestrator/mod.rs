//! Orchestrator - office engine and meeting phase machine
//!
//! See `engine.rs` for the tick loop and `meeting.rs` for the emergency
//! meeting choreography.

pub mod checkpoint;
pub mod engine;
pub mod meeting;

// Re-export main types for convenience
pub use engine::{ChatTurn, OfficeEngine, SimulationError, TickResult};
pub use meeting::{
    AgentRoster, CameraControl, IgnoreReason, MeetingOrchestrator, MeetingPhase, MeetingTrigger,
    ReactionBatch, ReactionOutcome, ReactionRequest,
};

// Re-export checkpoint types
pub use checkpoint::{config_hash, snapshot_digest, AgentView, OfficeSnapshot};
