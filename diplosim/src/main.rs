use anyhow::{Context, Result};
use clap::Parser;
use diplosim::scenario::{apply_action, demo_scenario, load_scenario};
use diplosim_core::{
    combined_relation_text, profiling, RealmNames, RecordingMaterializer, TraceLevel,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scenario file (JSON). Runs the built-in demo when omitted.
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Number of turns to run
    #[arg(short, long, default_value_t = 20)]
    turns: u32,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Write every diplomacy event to this file as JSON lines
    #[arg(long)]
    events: Option<PathBuf>,

    /// Write the final relationship state to this file
    #[arg(long)]
    save: Option<PathBuf>,

    /// Tracy span detail (info, debug, trace); needs the `tracy` feature
    #[arg(long, default_value = "info")]
    trace_level: TraceLevel,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = std::str::FromStr::from_str(&args.log_level).unwrap_or(log::LevelFilter::Info);
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .init();
    profiling::init_tracy(args.trace_level);

    log::info!("Starting diplosim...");

    let scenario = match &args.scenario {
        Some(path) => load_scenario(path)?,
        None => {
            log::info!("No scenario given, running the built-in demo");
            demo_scenario()
        }
    };
    if let Some(last) = scenario.last_action_turn() {
        if last >= args.turns {
            log::warn!(
                "Actions are scheduled up to turn {} but only {} turns will run",
                last,
                args.turns
            );
        }
    }

    let mut diplo = scenario.initial_state();
    let mut wars = RecordingMaterializer::default();

    // Game Loop
    for _ in 0..args.turns {
        let turn = diplo.turn;
        let logged = diplo.events().len();
        for action in scenario.actions_for(turn) {
            apply_action(&mut diplo, &scenario, action, &mut wars)
                .with_context(|| format!("Turn {}: {:?} failed", turn, action))?;
        }

        diplo.advance_turn();
        log::info!(
            "Turn: {} | Events: {}",
            turn,
            diplo.events().len() - logged
        );

        let frequency = diplo.config.checksum_frequency;
        if frequency > 0 && diplo.turn % frequency == 0 {
            log::debug!("Turn {} checksum: {:016x}", diplo.turn, diplo.checksum());
        }
    }

    log::info!(
        "Simulation finished at turn {} ({} wars recorded)",
        diplo.turn,
        wars.wars.len()
    );
    for owner in 0..diplo.realm_count() {
        let registry = diplo.registry(owner)?;
        for ledger in registry.ledgers() {
            log::info!(
                "{} -> {}: {} ({})",
                diplo.empire_name(owner),
                diplo.empire_name(ledger.target()),
                combined_relation_text(ledger),
                ledger.aggregate_score()
            );
        }
    }

    if let Some(path) = &args.events {
        let events = diplo.events();
        events
            .to_jsonl_file(path)
            .with_context(|| format!("Failed to write events to {}", path.display()))?;
        log::info!("Wrote {} events to {}", events.len(), path.display());
    }

    if let Some(path) = &args.save {
        let json = diplo.to_json()?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write save to {}", path.display()))?;
        log::info!("Saved state to {}", path.display());
    }

    Ok(())
}
