//! Virtual Office Core - Rust Engine
//!
//! Pannable, zoomable office floor populated by wandering agents, with an
//! "emergency meeting" choreography that gathers everyone, fetches one
//! reaction per agent from a reasoning client, and puts things back.
//!
//! # Architecture
//!
//! - **core**: Simulated clock and plane geometry
//! - **config**: Office configuration and validation
//! - **models**: Domain types (Agent, Notice, Event)
//! - **viewport**: Coordinate engine and camera controller
//! - **motion**: Agent motion simulator and position notifications
//! - **orchestrator**: Office engine (tick loop) and meeting phase machine
//! - **reasoning**: Reasoning client contract, retries, fallbacks
//! - **runtime**: Async driver (frame loop, commands, reaction fan-out)
//! - **rng**: Deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. Zoom stays inside `[min_zoom, max_zoom]`
//! 2. All randomness is deterministic (seeded RNG)
//! 3. At most one meeting is active at a time

// Module declarations
pub mod config;
pub mod core;
pub mod models;
pub mod motion;
pub mod orchestrator;
pub mod reasoning;
pub mod rng;
pub mod runtime;
pub mod viewport;

// Re-exports for convenience
pub use config::{ConfigError, OfficeConfig};
pub use crate::core::geometry::{Bounds, Point};
pub use crate::core::time::SimClock;
pub use models::{
    agent::{Agent, AgentSpec, Facing, MotionMode},
    event::{Event, EventLog},
    notice::Notice,
};
pub use motion::{MotionSimulator, PositionChanged};
pub use orchestrator::{
    MeetingPhase, MeetingTrigger, OfficeEngine, OfficeSnapshot, SimulationError, TickResult,
};
pub use reasoning::{NextState, ReactionService, ReasoningClient, ReasoningError, ScriptedClient};
pub use rng::RngManager;
pub use runtime::{OfficeCommand, OfficeHandle, OfficeRuntime};
pub use viewport::{ViewportController, ViewportState};

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn virtual_office_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::office::PyOffice>()?;
    Ok(())
}
