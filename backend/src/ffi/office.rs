//! PyO3 wrapper for OfficeEngine
//!
//! Exposes the sans-IO engine to Python render layers. The Python side owns
//! the frame loop and the reasoning calls; it ticks the engine, forwards
//! pointer events, and hands reaction batches back once they settle.

use std::collections::HashMap;

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;
use uuid::Uuid;

use super::types::{
    reaction_batch_to_py, simulation_error_to_py, snapshot_to_py, tick_result_to_py, trigger_to_py,
};
use crate::config::OfficeConfig;
use crate::core::geometry::Point;
use crate::models::agent::AgentSpec;
use crate::models::notice::Notice;
use crate::orchestrator::{snapshot_digest, OfficeEngine, ReactionOutcome};
use crate::reasoning::prompt::next_state_prompt;
use crate::reasoning::state::parse_next_state;
use crate::reasoning::ReasoningError;

/// Python wrapper for the Rust office engine
///
/// # Example (from Python)
///
/// ```python
/// from virtual_office_core import Office
///
/// office = Office('{"rng_seed": 7}')
/// office.spawn_agent("a1", "Robo", "#4caf50")
/// office.submit_notice("n1", "emergency meeting", "Fire drill")
/// for _ in range(40):
///     office.tick(16)
/// batch = office.take_reaction_batch()
/// office.settle_reactions(batch["meeting_id"], {"a1": "On my way!"})
/// ```
#[pyclass(name = "Office", unsendable)]
pub struct PyOffice {
    inner: OfficeEngine,
}

#[pymethods]
impl PyOffice {
    /// Create an office from an optional JSON config (defaults otherwise)
    ///
    /// Raises ValueError on malformed or invalid configuration.
    #[new]
    #[pyo3(signature = (config_json=None))]
    fn new(config_json: Option<&str>) -> PyResult<Self> {
        let config = match config_json {
            Some(json) => OfficeConfig::from_json_str(json)
                .map_err(|e| PyValueError::new_err(format!("Failed to parse config: {}", e)))?,
            None => OfficeConfig::default(),
        };
        let inner = OfficeEngine::new(config).map_err(simulation_error_to_py)?;
        Ok(PyOffice { inner })
    }

    #[pyo3(signature = (agent_id, name, color, x=None, y=None))]
    fn spawn_agent(
        &mut self,
        agent_id: &str,
        name: &str,
        color: &str,
        x: Option<f64>,
        y: Option<f64>,
    ) -> PyResult<()> {
        let mut spec = AgentSpec::new(agent_id, name, color);
        if let (Some(x), Some(y)) = (x, y) {
            spec = spec.at(Point::new(x, y));
        }
        self.inner.spawn_agent(spec).map_err(simulation_error_to_py)
    }

    fn set_speaking(&mut self, agent_id: &str, speaking: bool) -> PyResult<()> {
        self.inner
            .set_speaking(agent_id, speaking)
            .map_err(simulation_error_to_py)
    }

    /// Advance by `dt_ms`; returns moved count, phase and position notifications
    fn tick(&mut self, py: Python, dt_ms: u64) -> PyResult<Py<PyDict>> {
        let result = self.inner.tick(dt_ms);
        tick_result_to_py(py, &result)
    }

    fn current_tick(&self) -> u64 {
        self.inner.current_tick()
    }

    fn phase(&self) -> String {
        format!("{:?}", self.inner.phase())
    }

    fn submit_notice(
        &mut self,
        py: Python,
        notice_id: &str,
        category: &str,
        content: &str,
    ) -> PyResult<Py<PyDict>> {
        let trigger = self
            .inner
            .submit_notice(Notice::new(notice_id, category, content));
        trigger_to_py(py, &trigger)
    }

    /// Pending reaction requests, or None
    fn take_reaction_batch(&mut self, py: Python) -> PyResult<Option<Py<PyDict>>> {
        self.inner
            .take_reaction_batch()
            .map(|batch| reaction_batch_to_py(py, &batch))
            .transpose()
    }

    /// Settle a batch: `{agent_id: text}`, with None marking a failed request
    fn settle_reactions(
        &mut self,
        meeting_id: &str,
        outcomes: HashMap<String, Option<String>>,
    ) -> PyResult<bool> {
        let meeting_id = Uuid::parse_str(meeting_id)
            .map_err(|e| PyValueError::new_err(format!("Invalid meeting id: {}", e)))?;
        let mut outcomes: Vec<ReactionOutcome> = outcomes
            .into_iter()
            .map(|(agent_id, text)| ReactionOutcome {
                agent_id,
                result: text.ok_or_else(|| ReasoningError::Failed("reported by caller".to_string())),
            })
            .collect();
        outcomes.sort_by(|a, b| a.agent_id.cmp(&b.agent_id));
        Ok(self.inner.settle_reactions(meeting_id, outcomes))
    }

    // ========================================================================
    // Pointer input
    // ========================================================================

    fn on_wheel(&mut self, delta_y: f64, screen_x: f64, screen_y: f64) {
        self.inner.on_wheel(delta_y, Point::new(screen_x, screen_y));
    }

    fn on_pointer_down(&mut self, screen_x: f64, screen_y: f64) {
        self.inner.on_pointer_down(Point::new(screen_x, screen_y));
    }

    fn on_pointer_move(&mut self, screen_x: f64, screen_y: f64) {
        self.inner.on_pointer_move(Point::new(screen_x, screen_y));
    }

    fn on_pointer_up(&mut self) {
        self.inner.on_pointer_up();
    }

    fn zoom_in(&mut self) -> bool {
        self.inner.zoom_in()
    }

    fn zoom_out(&mut self) -> bool {
        self.inner.zoom_out()
    }

    fn reset_view(&mut self) {
        self.inner.reset_view();
    }

    fn resize(&mut self, width: f64, height: f64) {
        self.inner.resize(width, height);
    }

    fn select_agent(&mut self, agent_id: &str) -> PyResult<()> {
        self.inner
            .select_agent(agent_id)
            .map_err(simulation_error_to_py)
    }

    fn record_chat_reply(&mut self, agent_id: &str, text: &str) -> PyResult<()> {
        self.inner
            .record_chat_reply(agent_id, text)
            .map_err(simulation_error_to_py)
    }

    /// Open a chat turn; returns the prompt to send to the model
    fn begin_chat(&mut self, agent_id: &str, message: &str) -> PyResult<String> {
        let turn = self
            .inner
            .begin_chat(agent_id)
            .map_err(simulation_error_to_py)?;
        Ok(next_state_prompt(&turn.agent_name, &turn.tags, message))
    }

    /// Close a chat turn with the model's raw JSON reply
    fn finish_chat(&mut self, agent_id: &str, reply_json: &str) -> PyResult<()> {
        let state = parse_next_state(reply_json).map_err(|e| PyValueError::new_err(e.to_string()))?;
        self.inner
            .finish_chat(agent_id, state)
            .map_err(simulation_error_to_py)
    }

    // ========================================================================
    // Render view
    // ========================================================================

    fn snapshot(&self, py: Python) -> PyResult<Py<PyDict>> {
        snapshot_to_py(py, &self.inner.snapshot())
    }

    fn snapshot_digest(&self) -> PyResult<String> {
        snapshot_digest(&self.inner.snapshot())
            .map_err(|e| PyRuntimeError::new_err(format!("Digest failed: {}", e)))
    }
}
