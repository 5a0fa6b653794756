//! Reserve Treasury CLI
//!
//! Configuration management, scripted simulation and snapshot inspection.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use console::{style, Term};

use reserve_treasury::cli::{
    last_step_time, render_json, OutputFormat, Script, ScriptRunner, SimulationReport, StatusSummary,
};
use reserve_treasury::core::config::TreasuryConfig;
use reserve_treasury::core::token::InMemoryAsset;
use reserve_treasury::storage::TreasurySnapshot;

/// Reserve Treasury CLI - treasury ledger with quorum-gated withdrawals
#[derive(Parser)]
#[command(name = "treasury")]
#[command(version = reserve_treasury::VERSION)]
#[command(about = "Command-line interface for the reserve treasury", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Output format (text, json, json-pretty)
    #[arg(short, long, env = "TREASURY_OUTPUT", default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configuration file management
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Replay a JSON script against an in-memory treasury
    Simulate {
        /// Script file
        #[arg(short, long)]
        script: PathBuf,

        /// Stop at the first failing step
        #[arg(long)]
        stop_on_error: bool,

        /// Save the final treasury as a snapshot
        #[arg(long)]
        save_snapshot: Option<PathBuf>,
    },

    /// Show a saved snapshot
    Status {
        /// Snapshot file
        #[arg(short, long, env = "TREASURY_SNAPSHOT")]
        snapshot: PathBuf,

        /// Pegged supply to compute the backing ratio against
        #[arg(long)]
        peg_supply: Option<u64>,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Write a configuration file
    Init {
        /// Destination file
        #[arg(short, long, default_value = "treasury.json")]
        path: PathBuf,

        /// Use the testnet preset
        #[arg(long)]
        testnet: bool,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the effective configuration (file plus environment overrides)
    Show {
        /// Configuration file; defaults are used when absent
        #[arg(short, long)]
        path: Option<PathBuf>,
    },
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let term = Term::stdout();

    if let Err(e) = run_command(&cli, &term) {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
}

fn run_command(cli: &Cli, term: &Term) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Config(ConfigCommands::Init { path, testnet, force }) => {
            cmd_config_init(path, *testnet, *force, term)
        }
        Commands::Config(ConfigCommands::Show { path }) => cmd_config_show(cli, path.as_deref(), term),
        Commands::Simulate {
            script,
            stop_on_error,
            save_snapshot,
        } => cmd_simulate(cli, script, *stop_on_error, save_snapshot.as_deref(), term),
        Commands::Status { snapshot, peg_supply } => cmd_status(cli, snapshot, *peg_supply, term),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMMAND HANDLERS
// ═══════════════════════════════════════════════════════════════════════════════

fn cmd_config_init(path: &Path, testnet: bool, force: bool, term: &Term) -> anyhow::Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    let config = if testnet {
        TreasuryConfig::testnet()
    } else {
        TreasuryConfig::default()
    };
    config
        .save(path)
        .with_context(|| format!("writing {}", path.display()))?;

    term.write_line(&format!(
        "{} Configuration written to {}",
        style("✓").green(),
        style(path.display()).yellow()
    ))?;
    Ok(())
}

fn cmd_config_show(cli: &Cli, path: Option<&Path>, term: &Term) -> anyhow::Result<()> {
    let base = match path {
        Some(path) => TreasuryConfig::load(path).with_context(|| format!("reading {}", path.display()))?,
        None => TreasuryConfig::default(),
    };
    let config = base.from_env()?;

    if let Some(json) = render_json(cli.format, &config)? {
        term.write_line(&json)?;
        return Ok(());
    }

    term.write_line(&format!("{} Treasury configuration", style("→").cyan()))?;
    term.write_line(&format!("  Withdrawal delay:   {}s", config.withdrawal_delay_secs))?;
    term.write_line(&format!("  Required approvals: {}", config.required_approvals))?;
    term.write_line(&format!("  Max deployment:     {}", config.max_deployment))?;
    let fees = &config.fee_structure;
    term.write_line(&format!(
        "  Fees (bps):         mint {} / burn {} / liquidation {}",
        fees.minting_fee, fees.burning_fee, fees.liquidation_fee
    ))?;
    term.write_line(&format!(
        "  Shares (bps):       stability {} / governance {} / development {}",
        fees.stability_share, fees.governance_share, fees.development_share
    ))?;
    Ok(())
}

fn cmd_simulate(
    cli: &Cli,
    script: &Path,
    stop_on_error: bool,
    save_snapshot: Option<&Path>,
    term: &Term,
) -> anyhow::Result<()> {
    let parsed = Script::load(script).with_context(|| format!("reading {}", script.display()))?;
    let mut runner = ScriptRunner::new(parsed)?.with_stop_on_error(stop_on_error);
    let report = runner.run()?;

    if let Some(path) = save_snapshot {
        TreasurySnapshot::capture(runner.treasury(), last_step_time(&report))?
            .save(path)
            .with_context(|| format!("writing {}", path.display()))?;
    }

    if let Some(json) = render_json(cli.format, &report)? {
        term.write_line(&json)?;
        return Ok(());
    }

    print_steps(&report, term)?;

    term.write_line("")?;
    term.write_line(&format!("{} Events ({})", style("→").cyan(), report.events.len()))?;
    for record in &report.events {
        term.write_line(&format!(
            "  [{}] {}",
            style(record.timestamp).dim(),
            style(record.event.event_type()).yellow()
        ))?;
    }

    term.write_line("")?;
    print_summary(&StatusSummary::from_state(&report.final_state, None), term)?;
    term.write_line(&format!("  Treasury balance: {}", style(report.treasury_balance).green()))?;
    Ok(())
}

fn cmd_status(cli: &Cli, snapshot: &Path, peg_supply: Option<u64>, term: &Term) -> anyhow::Result<()> {
    let snapshot = TreasurySnapshot::<InMemoryAsset>::load(snapshot)
        .with_context(|| format!("loading {}", snapshot.display()))?;

    if let Some(json) = render_json(cli.format, &snapshot.state)? {
        term.write_line(&json)?;
        return Ok(());
    }

    term.write_line(&format!(
        "{} Treasury {} at t={}",
        style("ℹ").blue(),
        style(snapshot.treasury).yellow(),
        snapshot.taken_at
    ))?;
    print_summary(&StatusSummary::from_state(&snapshot.state, peg_supply), term)?;
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// RENDERING
// ═══════════════════════════════════════════════════════════════════════════════

fn print_steps(report: &SimulationReport, term: &Term) -> anyhow::Result<()> {
    term.write_line(&format!("{} Steps ({})", style("→").cyan(), report.steps.len()))?;
    for step in &report.steps {
        match (&step.output, &step.error) {
            (_, Some(error)) => term.write_line(&format!(
                "  {} #{} t={} {}: {}",
                style("✗").red(),
                step.index,
                step.at,
                step.caller,
                style(error).red()
            ))?,
            (Some(output), None) => term.write_line(&format!(
                "  {} #{} t={} {}: {}",
                style("✓").green(),
                step.index,
                step.at,
                step.caller,
                output
            ))?,
            (None, None) => {}
        }
    }

    if report.failures() > 0 {
        term.write_line(&format!(
            "{} {} step(s) failed",
            style("⚠").yellow(),
            report.failures()
        ))?;
    }
    Ok(())
}

fn print_summary(summary: &StatusSummary, term: &Term) -> anyhow::Result<()> {
    for (title, rows) in &summary.sections {
        term.write_line(&format!("{} {}", style("→").cyan(), style(title).bold()))?;
        for (label, value) in rows {
            term.write_line(&format!("  {:<20} {}", format!("{}:", label), value))?;
        }
    }
    Ok(())
}
