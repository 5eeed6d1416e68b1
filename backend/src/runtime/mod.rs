//! Async driver for a live office session
//!
//! One task owns the `OfficeEngine` and multiplexes, in a single `select!`:
//!
//! ```text
//! frame interval ──▶ engine.tick(dt_ms) ──▶ take_reaction_batch ──┐
//! command channel ──▶ pointer / agent / notice / chat operations  │
//! in-flight work ◀────────────────────────────────────────────────┘
//!      └─▶ settle_reactions / finish_chat
//! ```
//!
//! A reaction batch becomes one future that starts every agent's request at
//! once and resolves when all of them have settled. In-flight futures are
//! polled by the same loop, so ticks keep running while requests are pending
//! and nothing touches the engine concurrently.

pub mod command;

pub use command::{OfficeCommand, OfficeHandle, RuntimeError};

use crate::orchestrator::{
    OfficeEngine, OfficeSnapshot, ReactionBatch, ReactionOutcome, SimulationError,
};
use crate::reasoning::{NextState, ReactionService, ReasoningClient};
use futures::future::{join_all, BoxFuture};
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Default frame period (about 60 frames per second)
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Finished background work, applied back on the loop
enum Completion {
    Reactions {
        meeting_id: Uuid,
        outcomes: Vec<ReactionOutcome>,
    },
    Chat {
        agent_id: String,
        state: NextState,
    },
}

type InFlight = FuturesUnordered<BoxFuture<'static, Completion>>;

pub struct OfficeRuntime<C> {
    engine: OfficeEngine,
    service: Arc<ReactionService<C>>,
    frame_interval: Duration,
    commands: mpsc::UnboundedReceiver<OfficeCommand>,
    snapshots: watch::Sender<OfficeSnapshot>,
}

impl<C: ReasoningClient + 'static> OfficeRuntime<C> {
    pub fn new(engine: OfficeEngine, service: ReactionService<C>) -> (Self, OfficeHandle) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(engine.snapshot());
        let runtime = Self {
            engine,
            service: Arc::new(service),
            frame_interval: DEFAULT_FRAME_INTERVAL,
            commands: command_rx,
            snapshots: snapshot_tx,
        };
        (runtime, OfficeHandle::new(command_tx, snapshot_rx))
    }

    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    pub fn engine(&self) -> &OfficeEngine {
        &self.engine
    }

    /// Run until `Shutdown` arrives or every handle is dropped
    ///
    /// Returns the engine so callers can inspect the final state.
    pub async fn run(mut self) -> OfficeEngine {
        let mut frames = tokio::time::interval(self.frame_interval);
        frames.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last_frame = Instant::now();
        let mut in_flight: InFlight = FuturesUnordered::new();

        info!(frame_ms = self.frame_interval.as_millis() as u64, "Office runtime started");

        loop {
            tokio::select! {
                _ = frames.tick() => {
                    let elapsed = Instant::now().duration_since(last_frame);
                    let dt_ms = elapsed.as_millis() as u64;
                    last_frame += Duration::from_millis(dt_ms);

                    self.engine.tick(dt_ms);
                    if let Some(batch) = self.engine.take_reaction_batch() {
                        in_flight.push(fan_out(Arc::clone(&self.service), batch));
                    }
                }
                command = self.commands.recv() => {
                    match command {
                        None | Some(OfficeCommand::Shutdown) => break,
                        Some(command) => {
                            if let Err(err) = self.apply(command, &mut in_flight) {
                                warn!(error = %err, "Office command rejected");
                            }
                        }
                    }
                }
                Some(done) = in_flight.next(), if !in_flight.is_empty() => {
                    self.complete(done);
                }
            }
            self.snapshots.send_replace(self.engine.snapshot());
        }

        info!(
            tick = self.engine.current_tick(),
            pending = in_flight.len(),
            "Office runtime stopped"
        );
        self.engine
    }

    fn apply(&mut self, command: OfficeCommand, in_flight: &mut InFlight) -> Result<(), SimulationError> {
        let engine = &mut self.engine;
        match command {
            OfficeCommand::Wheel { delta_y, screen } => engine.on_wheel(delta_y, screen),
            OfficeCommand::PointerDown(p) => engine.on_pointer_down(p),
            OfficeCommand::PointerMove(p) => engine.on_pointer_move(p),
            OfficeCommand::PointerUp => engine.on_pointer_up(),
            OfficeCommand::ZoomIn => {
                engine.zoom_in();
            }
            OfficeCommand::ZoomOut => {
                engine.zoom_out();
            }
            OfficeCommand::ResetView => engine.reset_view(),
            OfficeCommand::Resize { width, height } => engine.resize(width, height),
            OfficeCommand::SpawnAgent(spec) => engine.spawn_agent(spec)?,
            OfficeCommand::SetSpeaking { agent_id, speaking } => {
                engine.set_speaking(&agent_id, speaking)?
            }
            OfficeCommand::SelectAgent(agent_id) => engine.select_agent(&agent_id)?,
            OfficeCommand::Chat { agent_id, message } => {
                let turn = engine.begin_chat(&agent_id)?;
                let service = Arc::clone(&self.service);
                in_flight.push(
                    async move {
                        let state = service
                            .reason_next_state(&turn.agent_name, &turn.tags, &message)
                            .await;
                        Completion::Chat { agent_id, state }
                    }
                    .boxed(),
                );
            }
            OfficeCommand::SubmitNotice(notice) => {
                engine.submit_notice(notice);
            }
            OfficeCommand::Shutdown => {}
        }
        Ok(())
    }

    fn complete(&mut self, done: Completion) {
        match done {
            Completion::Reactions { meeting_id, outcomes } => {
                let settled = outcomes.len();
                if !self.engine.settle_reactions(meeting_id, outcomes) {
                    debug!(meeting_id = %meeting_id, settled, "Reaction batch arrived after its meeting moved on");
                }
            }
            Completion::Chat { agent_id, state } => {
                if let Err(err) = self.engine.finish_chat(&agent_id, state) {
                    warn!(error = %err, "Chat reply dropped");
                }
            }
        }
    }
}

/// All of a meeting's reaction requests, started together
fn fan_out<C: ReasoningClient + 'static>(
    service: Arc<ReactionService<C>>,
    batch: ReactionBatch,
) -> BoxFuture<'static, Completion> {
    async move {
        let ReactionBatch { meeting_id, requests } = batch;
        debug!(meeting_id = %meeting_id, requests = requests.len(), "Reaction fan-out started");
        let calls = requests.into_iter().map(|request| {
            let service = Arc::clone(&service);
            async move {
                let result = service
                    .try_react_to(&request.agent_name, &request.context)
                    .await;
                ReactionOutcome {
                    agent_id: request.agent_id,
                    result,
                }
            }
        });
        let outcomes = join_all(calls).await;
        Completion::Reactions { meeting_id, outcomes }
    }
    .boxed()
}
