//! Domain models for the virtual office

pub mod agent;
pub mod event;
pub mod notice;

// Re-exports
pub use agent::{Agent, AgentSpec, Facing, MotionMode};
pub use event::{Event, EventLog};
pub use notice::Notice;
