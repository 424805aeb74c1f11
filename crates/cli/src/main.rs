//! `taskflow` CLI entry-point.
//!
//! Available sub-commands:
//! - `validate` — validate a rule-definition JSON file.
//! - `replay`   — run an event file through the engine and print statistics.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use actions::builtin::notify::LogSink;
use actions::ActionRegistry;
use engine::{loader, ActionExecutor, Event, InMemoryRuleStore, RuleEngine, RuleRecord};
use monitor::{WorkflowAnalytics, WorkflowMonitor};

#[derive(Parser)]
#[command(
    name = "taskflow",
    about = "Workflow automation engine for project and task events",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a rule-definition JSON file (a list of rule records).
    Validate {
        /// Path to the rules JSON file.
        path: PathBuf,
    },
    /// Load rules, feed an event file through the engine, print statistics.
    Replay {
        /// Path to the rules JSON file.
        rules: PathBuf,
        /// Path to the events JSON file (a list of events).
        events: PathBuf,
        /// Execution history cap while replaying.
        #[arg(long, default_value_t = 1000)]
        history: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Command::Validate { path } => validate(&path),
        Command::Replay {
            rules,
            events,
            history,
        } => replay(&rules, &events, history).await,
    }
}

fn read_records(path: &PathBuf) -> anyhow::Result<Vec<RuleRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read rules file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("{} is not a rule-record list", path.display()))
}

fn validate(path: &PathBuf) -> anyhow::Result<()> {
    let records = read_records(path)?;

    let mut bad = 0usize;
    for record in &records {
        match loader::decode_rule(record) {
            Ok(rule) => {
                println!(
                    "✅ {} ('{}') — triggers on {}, {} action(s)",
                    rule.id,
                    rule.name,
                    rule.trigger.event_type,
                    rule.actions.len()
                );
            }
            Err(e) => {
                eprintln!("❌ {e}");
                bad += 1;
            }
        }
    }

    if bad > 0 {
        eprintln!("{bad} of {} rule(s) failed to validate", records.len());
        std::process::exit(1);
    }
    println!("All {} rule(s) are valid.", records.len());
    Ok(())
}

async fn replay(rules: &PathBuf, events: &PathBuf, history: usize) -> anyhow::Result<()> {
    let store = InMemoryRuleStore::seeded(read_records(rules)?);

    let content = std::fs::read_to_string(events)
        .with_context(|| format!("cannot read events file {}", events.display()))?;
    let events: Vec<Event> = serde_json::from_str(&content)
        .with_context(|| format!("{} is not an event list", events.display()))?;

    let registry = ActionRegistry::builtin(Arc::new(LogSink));
    let monitor = Arc::new(WorkflowMonitor::new(history));
    let engine = RuleEngine::new(ActionExecutor::new(Arc::new(registry)), monitor.clone());

    let loaded = engine.load_from_store(&store).await;
    info!(rules = loaded, events = events.len(), "starting replay");

    for event in &events {
        engine.process_event(event).await;
    }

    let stats = monitor.statistics(Duration::from_secs(24 * 3600)).await;
    println!("events processed : {}", events.len());
    println!("executions       : {}", stats.total);
    println!("  completed      : {}", stats.succeeded);
    println!("  failed         : {}", stats.failed);
    println!("avg completion   : {:.1} ms", stats.average_completion_ms);

    let analytics = WorkflowAnalytics::new(monitor);
    let top = analytics.most_active_rules(5).await;
    if !top.is_empty() {
        println!("most active rules:");
        for activity in top {
            println!(
                "  {:>4}× {} ('{}')",
                activity.executions, activity.rule_id, activity.rule_name
            );
        }
    }

    let patterns = analytics.common_failure_patterns().await;
    if !patterns.is_empty() {
        println!("failure patterns:");
        for pattern in patterns {
            println!("  {:>4}× {}", pattern.occurrences, pattern.pattern);
        }
    }

    Ok(())
}
