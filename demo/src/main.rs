//! Chimera reference campaign runtime: demo CLI
//!
//! Runs one or all of the reference campaign scenarios, or plans a campaign
//! read from disk and prints the resulting task batch.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- trend-jacked
//!   cargo run -p demo -- reviewed-launch
//!   cargo run -p demo -- failure-recovery
//!   cargo run -p demo -- escalation
//!   cargo run -p demo -- timeout
//!   cargo run -p demo -- plan --campaign campaign.json

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use chimera_contracts::{
    campaign::CampaignManifest,
    error::{ChimeraError, ChimeraResult},
    task::PlannerId,
};
use chimera_core::{traits::SystemClock, DEFAULT_PLANNER_ID};
use chimera_ref_campaign::{
    runtime,
    scenarios::{escalation, failure_recovery, reviewed_launch, timeout, trend_jacked},
    ScenarioOutcome,
};

// ── CLI definition ────────────────────────────────────────────────────────────

/// Chimera campaign planner and task orchestrator demo.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "Chimera reference campaign runtime demo",
    long_about = "Runs Chimera campaign scenarios showing decomposition, dependency-ordered\n\
                  dispatch, recovery policy, escalation and timeouts."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run every scenario in sequence.
    RunAll,
    /// Scenario 1: fetch → generate → publish chain.
    TrendJacked,
    /// Scenario 2: multi-platform launch gated by a review.
    ReviewedLaunch,
    /// Scenario 3: abort on a failed fetch, containment of a failed publish.
    FailureRecovery,
    /// Scenario 4: low-confidence draft held until a reviewer overrides it.
    Escalation,
    /// Scenario 5: stalled worker, timeout and re-plan.
    Timeout,
    /// Decompose a campaign JSON file and print the task batch.
    Plan {
        /// Path to the campaign manifest.
        #[arg(long)]
        campaign: PathBuf,
        /// Planner identity stamped on every manifest.
        #[arg(long, default_value = DEFAULT_PLANNER_ID)]
        planner_id: String,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Set RUST_LOG=info to see every telemetry event, debug for more.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Plan {
            campaign,
            planner_id,
        } => plan(&campaign, planner_id),
        scenario => {
            print_banner();
            run(scenario)
        }
    };

    if let Err(e) = result {
        eprintln!("Demo error: {}", e);
        std::process::exit(1);
    }
}

// ── Scenario dispatch ─────────────────────────────────────────────────────────

fn run(command: Command) -> ChimeraResult<()> {
    let outcomes = match command {
        Command::RunAll => vec![
            trend_jacked::run_scenario()?,
            reviewed_launch::run_scenario()?,
            failure_recovery::run_scenario()?,
            escalation::run_scenario()?,
            timeout::run_scenario()?,
        ],
        Command::TrendJacked => vec![trend_jacked::run_scenario()?],
        Command::ReviewedLaunch => vec![reviewed_launch::run_scenario()?],
        Command::FailureRecovery => vec![failure_recovery::run_scenario()?],
        Command::Escalation => vec![escalation::run_scenario()?],
        Command::Timeout => vec![timeout::run_scenario()?],
        Command::Plan { .. } => Vec::new(),
    };
    print_summary(&outcomes);
    Ok(())
}

fn print_summary(outcomes: &[ScenarioOutcome]) {
    println!("Summary");
    println!("-------");
    for outcome in outcomes {
        println!(
            "  {:<18} {} task(s), {} event(s), journal {}",
            outcome.name,
            outcome.tasks.len(),
            outcome.events.len(),
            if outcome.journal_verified { "VERIFIED" } else { "FAILED" }
        );
    }
    println!();
    println!("All selected scenarios completed.");
}

// ── Plan ──────────────────────────────────────────────────────────────────────

fn plan(path: &Path, planner_id: String) -> ChimeraResult<()> {
    let text = std::fs::read_to_string(path).map_err(|e| ChimeraError::ConfigError {
        reason: format!("failed to read campaign '{}': {e}", path.display()),
    })?;
    let campaign = CampaignManifest::from_json(&text)?;

    let planner =
        runtime::planner(Box::new(SystemClock))?.with_planner_id(PlannerId(planner_id));
    let graph = planner.plan_graph(&campaign)?;
    info!(tasks = graph.len(), edges = graph.edge_count(), "campaign planned");

    let batch = graph
        .topological_order()
        .into_iter()
        .map(|m| m.to_value())
        .collect::<ChimeraResult<Vec<_>>>()?;
    let pretty =
        serde_json::to_string_pretty(&batch).map_err(|e| ChimeraError::MalformedInput {
            reason: format!("batch could not be rendered: {e}"),
        })?;
    println!("{pretty}");
    Ok(())
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("Chimera: Campaign Planner & Orchestrator");
    println!("Reference Campaign Demo");
    println!("=========================================");
    println!();
    println!("Per campaign:");
    println!("  [1] Planner decomposes the campaign by intent into task manifests");
    println!("  [2] Every manifest is schema-validated; the batch must form a DAG");
    println!("  [3] Workers claim READY tasks in priority order and run mock skills");
    println!("  [4] Results are validated before any state changes");
    println!("  [5] Failures, escalations and timeouts go to the recovery policy");
    println!("  [6] Every lifecycle event lands in a SHA-256 chained journal");
    println!();
}
