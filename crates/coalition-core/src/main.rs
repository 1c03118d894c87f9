//! Coalition Formation Simulation
//!
//! Runs rounds until no stable partition remains or the round limit is hit,
//! printing a summary of every round and the final matrices.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use coalition_core::output::write_report;
use coalition_core::{EngineError, Game, SimulationConfig};
use coalition_events::{FinalReport, RoundReport};
use tracing_subscriber::EnvFilter;

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "coalition_sim")]
#[command(about = "Reputation-driven coalition formation simulation")]
struct Args {
    /// Number of agents (at least 3)
    agents: Option<usize>,

    /// Review policy: pessimist or optimist
    reviews: Option<String>,

    /// Preference policy: average, minimum or maximum
    preferences: Option<String>,

    /// Stability predicate: nash, is or ics
    game: Option<String>,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many rounds
    #[arg(long)]
    rounds: Option<u64>,

    /// TOML configuration file; positional arguments override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the final report as JSON to this path
    #[arg(long)]
    report: Option<PathBuf>,
}

impl Args {
    fn into_config(self) -> Result<(SimulationConfig, Option<PathBuf>), EngineError> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::load(path)?,
            None => SimulationConfig::default(),
        };

        if let Some(agents) = self.agents {
            config.agents = agents;
        }
        if let Some(name) = &self.reviews {
            config.review_policy = name.parse()?;
        }
        if let Some(name) = &self.preferences {
            config.preference_policy = name.parse()?;
        }
        if let Some(name) = &self.game {
            config.stability = name.parse()?;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.rounds.is_some() {
            config.max_rounds = self.rounds;
        }

        Ok((config, self.report))
    }
}

fn print_round(report: &RoundReport) {
    let coalitions: Vec<String> = report
        .coalitions
        .iter()
        .map(|group| {
            let members: Vec<String> = group.iter().map(u32::to_string).collect();
            format!("({})", members.join(" "))
        })
        .collect();
    let order = |ids: Vec<u32>| {
        ids.iter().map(u32::to_string).collect::<Vec<_>>().join(" < ")
    };

    println!("### Round {} ###", report.round);
    println!("Coalitions:     {}", coalitions.join(" "));
    println!("Eigen trust:    {}", order(report.reputation_ids()));
    println!("Reliabilities:  {}", order(report.reliability_ids()));
    println!("Success rate:   {:.4}", report.success_rate);
    println!("Good placement: {}", report.good_placement);
    if !report.convergence.converged {
        println!(
            "  (reputation did not converge after {} iterations)",
            report.convergence.iterations
        );
    }
    println!();
}

fn print_final(report: &FinalReport) {
    match report.termination {
        Some(reason) => println!("Game Over! ({} rounds, {:?})", report.rounds_played, reason),
        None => println!("Stopped after {} rounds", report.rounds_played),
    }
    println!();
    println!("Reviews:");
    for row in &report.review_matrix {
        let cells: Vec<String> = row.iter().map(|v| format!("{:>5}", v)).collect();
        println!("  {}", cells.join(" "));
    }
    println!("Normalized reviews:");
    for row in &report.normalized_reviews {
        let cells: Vec<String> = row.iter().map(|v| format!("{:.4}", v)).collect();
        println!("  {}", cells.join(" "));
    }
    println!("Reputations:");
    for scored in &report.reputations {
        println!("  {}: {:.4}", scored.agent_id, scored.score);
    }
    println!("Reliabilities:");
    for scored in &report.reliabilities {
        println!("  {}: {:.4}", scored.agent_id, scored.score);
    }
}

fn run(args: Args) -> Result<(), EngineError> {
    let (config, report_path) = args.into_config()?;
    let mut game = Game::new(&config)?;

    println!("Coalition Simulation");
    println!("====================");
    println!("Agents: {}", config.agents);
    println!("Reviews: {}", config.review_policy);
    println!("Preferences: {}", config.preference_policy);
    println!("Game: {}", config.stability);
    if let Some(seed) = config.seed {
        println!("Seed: {}", seed);
    }
    println!();

    let mut rounds = Vec::new();
    while let Some(report) = game.step()? {
        print_round(&report);
        rounds.push(report);
    }

    let report = game.final_report(rounds);
    print_final(&report);

    if let Some(path) = report_path {
        match write_report(&report, &path) {
            Ok(()) => println!("\nWrote report to {}", path.display()),
            Err(e) => eprintln!("Warning: Could not write report: {}", e),
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
