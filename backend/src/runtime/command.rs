//! Commands accepted by a running office, and the handle that sends them

use crate::core::geometry::Point;
use crate::models::agent::AgentSpec;
use crate::models::notice::Notice;
use crate::orchestrator::OfficeSnapshot;
use thiserror::Error;
use tokio::sync::{mpsc, watch};

/// Input for the office loop: UI events plus collaborator signals
#[derive(Debug, Clone, PartialEq)]
pub enum OfficeCommand {
    Wheel { delta_y: f64, screen: Point },
    PointerDown(Point),
    PointerMove(Point),
    PointerUp,
    ZoomIn,
    ZoomOut,
    ResetView,
    Resize { width: f64, height: f64 },
    SpawnAgent(AgentSpec),
    SetSpeaking { agent_id: String, speaking: bool },
    SelectAgent(String),
    /// User message to one agent; the agent speaks until its reply lands
    Chat { agent_id: String, message: String },
    SubmitNotice(Notice),
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("Office runtime has stopped")]
    Stopped,
}

/// Client side of a running office
#[derive(Debug, Clone)]
pub struct OfficeHandle {
    commands: mpsc::UnboundedSender<OfficeCommand>,
    snapshots: watch::Receiver<OfficeSnapshot>,
}

impl OfficeHandle {
    pub(crate) fn new(
        commands: mpsc::UnboundedSender<OfficeCommand>,
        snapshots: watch::Receiver<OfficeSnapshot>,
    ) -> Self {
        Self { commands, snapshots }
    }

    pub fn send(&self, command: OfficeCommand) -> Result<(), RuntimeError> {
        self.commands.send(command).map_err(|_| RuntimeError::Stopped)
    }

    pub fn submit_notice(&self, notice: Notice) -> Result<(), RuntimeError> {
        self.send(OfficeCommand::SubmitNotice(notice))
    }

    pub fn spawn_agent(&self, spec: AgentSpec) -> Result<(), RuntimeError> {
        self.send(OfficeCommand::SpawnAgent(spec))
    }

    pub fn shutdown(&self) -> Result<(), RuntimeError> {
        self.send(OfficeCommand::Shutdown)
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> OfficeSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Wait for the next published snapshot
    pub async fn changed(&mut self) -> Result<OfficeSnapshot, RuntimeError> {
        self.snapshots
            .changed()
            .await
            .map_err(|_| RuntimeError::Stopped)?;
        Ok(self.snapshots.borrow_and_update().clone())
    }

    /// Independent receiver for render layers
    pub fn subscribe(&self) -> watch::Receiver<OfficeSnapshot> {
        self.snapshots.clone()
    }
}
