//! Type conversion utilities for FFI boundary
//!
//! Converts between Rust types and PyO3-compatible types (PyDict, lists of dicts).

use pyo3::exceptions::{PyKeyError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::models::agent::Facing;
use crate::orchestrator::{
    AgentView, MeetingTrigger, OfficeSnapshot, ReactionBatch, SimulationError, TickResult,
};

/// Map engine errors onto the closest Python exception
pub fn simulation_error_to_py(err: SimulationError) -> PyErr {
    match err {
        SimulationError::AgentNotFound(_) => PyKeyError::new_err(err.to_string()),
        SimulationError::InvalidConfig(_) | SimulationError::DuplicateAgent(_) => {
            PyValueError::new_err(err.to_string())
        }
        SimulationError::SerializationError(_) => PyRuntimeError::new_err(err.to_string()),
    }
}

fn facing_name(facing: Facing) -> &'static str {
    match facing {
        Facing::Left => "left",
        Facing::Right => "right",
    }
}

/// Convert TickResult to Python dict
pub fn tick_result_to_py(py: Python, result: &TickResult) -> PyResult<Py<PyDict>> {
    let dict = PyDict::new(py);

    dict.set_item("tick", result.tick)?;
    dict.set_item("time_ms", result.time_ms)?;
    dict.set_item("moved", result.moved)?;
    dict.set_item("phase", format!("{:?}", result.phase))?;

    let mut notifications = Vec::with_capacity(result.notifications.len());
    for change in &result.notifications {
        let item = PyDict::new(py);
        item.set_item("agent_id", &change.agent_id)?;
        item.set_item("x", change.position.x)?;
        item.set_item("y", change.position.y)?;
        item.set_item("facing", facing_name(change.facing))?;
        notifications.push(item);
    }
    dict.set_item("notifications", notifications)?;

    Ok(dict.unbind())
}

/// Convert MeetingTrigger to Python dict (`started` plus id or reason)
pub fn trigger_to_py(py: Python, trigger: &MeetingTrigger) -> PyResult<Py<PyDict>> {
    let dict = PyDict::new(py);
    match trigger {
        MeetingTrigger::Started { meeting_id } => {
            dict.set_item("started", true)?;
            dict.set_item("meeting_id", meeting_id.to_string())?;
        }
        MeetingTrigger::Ignored { reason } => {
            dict.set_item("started", false)?;
            dict.set_item("reason", format!("{:?}", reason))?;
        }
    }
    Ok(dict.unbind())
}

pub fn reaction_batch_to_py(py: Python, batch: &ReactionBatch) -> PyResult<Py<PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("meeting_id", batch.meeting_id.to_string())?;

    let mut requests = Vec::with_capacity(batch.requests.len());
    for request in &batch.requests {
        let item = PyDict::new(py);
        item.set_item("agent_id", &request.agent_id)?;
        item.set_item("agent_name", &request.agent_name)?;
        item.set_item("context", &request.context)?;
        requests.push(item);
    }
    dict.set_item("requests", requests)?;

    Ok(dict.unbind())
}

fn agent_view_to_py<'py>(py: Python<'py>, agent: &AgentView) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("id", &agent.id)?;
    dict.set_item("name", &agent.name)?;
    dict.set_item("color", &agent.color)?;
    dict.set_item("x", agent.position.x)?;
    dict.set_item("y", agent.position.y)?;
    dict.set_item("target_x", agent.target.x)?;
    dict.set_item("target_y", agent.target.y)?;
    dict.set_item("facing", facing_name(agent.facing))?;
    dict.set_item("is_wobbling", agent.is_wobbling)?;
    dict.set_item("is_walking", agent.is_walking)?;
    dict.set_item("is_forced", agent.forced_target.is_some())?;
    dict.set_item("reaction", agent.reaction.clone())?;
    dict.set_item("chat_line", agent.chat_line.clone())?;
    dict.set_item("tags", agent.tags.clone())?;
    dict.set_item("active_thought", agent.active_thought.clone())?;
    dict.set_item("is_thinking", agent.is_thinking)?;
    dict.set_item("is_active", agent.is_active)?;
    Ok(dict)
}

/// Convert OfficeSnapshot to Python dict
pub fn snapshot_to_py(py: Python, snapshot: &OfficeSnapshot) -> PyResult<Py<PyDict>> {
    let dict = PyDict::new(py);

    dict.set_item("tick", snapshot.tick)?;
    dict.set_item("time_ms", snapshot.time_ms)?;
    dict.set_item("zoom", snapshot.viewport.zoom)?;
    dict.set_item("offset_x", snapshot.viewport.offset_x)?;
    dict.set_item("offset_y", snapshot.viewport.offset_y)?;
    dict.set_item("input_suspended", snapshot.input_suspended)?;
    dict.set_item("meeting_active", snapshot.meeting_active)?;
    dict.set_item("phase", format!("{:?}", snapshot.phase))?;

    let agents = snapshot
        .agents
        .iter()
        .map(|agent| agent_view_to_py(py, agent))
        .collect::<PyResult<Vec<_>>>()?;
    dict.set_item("agents", agents)?;

    Ok(dict.unbind())
}
