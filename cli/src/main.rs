use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use virtual_office_core::models::Event;
use virtual_office_core::{
    AgentSpec, Notice, OfficeConfig, OfficeEngine, OfficeRuntime, ReactionService, ScriptedClient,
};

const AGENT_NAMES: [&str; 8] = [
    "Bolt", "Cog", "Sprocket", "Widget", "Gizmo", "Rivet", "Servo", "Pixel",
];
const AGENT_COLORS: [&str; 4] = ["#4caf50", "#2196f3", "#ff9800", "#e91e63"];

#[derive(Parser)]
#[command(name = "virtual-office", version, about = "Headless virtual office simulator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the office for a fixed wall time with an offline reasoning client
    Run {
        /// Path to a JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the RNG seed
        #[arg(long)]
        seed: Option<u64>,

        /// Number of agents to spawn
        #[arg(long, default_value_t = 4)]
        agents: usize,

        /// Wall-clock seconds to run
        #[arg(long, default_value_t = 30)]
        seconds: u64,

        /// Content of an emergency-meeting notice to post
        #[arg(long)]
        notice: Option<String>,

        /// When to post the notice, in milliseconds after start
        #[arg(long, default_value_t = 2000)]
        notice_at_ms: u64,

        /// Agent name whose reasoning requests always fail
        #[arg(long)]
        fail_agent: Option<String>,

        /// Print the final snapshot as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_logging();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run {
            config,
            seed,
            agents,
            seconds,
            notice,
            notice_at_ms,
            fail_agent,
            json,
        } => {
            let mut config = match config {
                Some(path) => OfficeConfig::from_json_file(&path)
                    .with_context(|| format!("loading config from {}", path.display()))?,
                None => OfficeConfig::default(),
            };
            if let Some(seed) = seed {
                config.rng_seed = seed;
            }

            let plan = RunPlan {
                agents,
                duration: Duration::from_secs(seconds),
                notice,
                notice_at: Duration::from_millis(notice_at_ms),
                fail_agent,
            };
            plan.check()?;
            let engine = run_office(config, plan).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&engine.snapshot())?);
            } else {
                print_summary(&engine);
            }
            Ok(())
        }
    }
}

struct RunPlan {
    agents: usize,
    duration: Duration,
    notice: Option<String>,
    notice_at: Duration,
    fail_agent: Option<String>,
}

impl RunPlan {
    /// Reject plans whose notice would never be posted
    fn check(&self) -> Result<()> {
        if self.notice.is_some() && self.notice_at >= self.duration {
            bail!(
                "--notice-at-ms {} is not before the end of the run ({} ms); the notice would never be posted",
                self.notice_at.as_millis(),
                self.duration.as_millis()
            );
        }
        Ok(())
    }
}

async fn run_office(config: OfficeConfig, plan: RunPlan) -> Result<OfficeEngine> {
    let mut client = ScriptedClient::new("Beep boop, heading to the plaza!");
    if let Some(name) = &plan.fail_agent {
        client = client.failing_for(name.clone());
    }
    let service = ReactionService::new(client, &config);
    let engine = OfficeEngine::new(config).context("building office engine")?;

    let (runtime, handle) = OfficeRuntime::new(engine, service);
    let task = tokio::spawn(runtime.run());

    for index in 0..plan.agents {
        let base = AGENT_NAMES[index % AGENT_NAMES.len()];
        let name = if index < AGENT_NAMES.len() {
            base.to_string()
        } else {
            format!("{}-{}", base, index / AGENT_NAMES.len())
        };
        let color = AGENT_COLORS[index % AGENT_COLORS.len()];
        handle.spawn_agent(AgentSpec::new(format!("agent-{}", index + 1), name, color))?;
    }
    info!(agents = plan.agents, seconds = plan.duration.as_secs(), "Office running");

    match plan.notice {
        Some(content) => {
            tokio::time::sleep(plan.notice_at).await;
            handle.submit_notice(Notice::new("notice-1", "emergency meeting", content))?;
            tokio::time::sleep(plan.duration - plan.notice_at).await;
        }
        None => tokio::time::sleep(plan.duration).await,
    }

    handle.shutdown()?;
    task.await.context("office runtime task failed")
}

fn print_summary(engine: &OfficeEngine) {
    let snapshot = engine.snapshot();
    println!(
        "tick {} ({} ms), phase {:?}, zoom {:.2}",
        snapshot.tick, snapshot.time_ms, snapshot.phase, snapshot.viewport.zoom
    );

    let phases = engine.event_log().phase_sequence();
    if !phases.is_empty() {
        let names: Vec<String> = phases.iter().map(|p| format!("{:?}", p)).collect();
        println!("meeting phases: {}", names.join(" -> "));
    }

    for event in engine.event_log().events_of_type("ReactionAssigned") {
        if let Event::ReactionAssigned {
            agent_id,
            text,
            fallback,
            ..
        } = event
        {
            let marker = if *fallback { " (fallback)" } else { "" };
            println!("  {}: {}{}", agent_id, text, marker);
        }
    }

    for agent in &snapshot.agents {
        println!(
            "{:<10} {:<10} at ({:>7.1}, {:>7.1}) facing {:?}{}",
            agent.id,
            agent.name,
            agent.position.x,
            agent.position.y,
            agent.facing,
            if agent.is_walking { ", walking" } else { "" }
        );
    }
}
