//! Mafia strategy evolution driver.
//!
//! Runs the genetic algorithm for a configured number of generations,
//! prints the fitness trajectory and the best individual's traits, then
//! plays one showcase match with the evolved genomes and prints its log.

use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use evolver::{Evolver, TuningConfig};
use sim_core::{genome::TRAIT_NAMES, MafiaGame, MatchLogger};
use sim_events::{EvolutionReport, MatchEvent};

/// Command line arguments for the evolution run
#[derive(Parser, Debug)]
#[command(name = "mafia_evolve")]
#[command(about = "Evolves mafia agent strategies with a genetic algorithm")]
struct Args {
    /// Random seed for reproducibility
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of generations to evolve
    #[arg(long, default_value_t = 10)]
    generations: u32,

    /// Population size (overrides the tuning file)
    #[arg(long)]
    population: Option<usize>,

    /// Players per match (overrides the tuning file)
    #[arg(long)]
    players: Option<usize>,

    /// Matches per roster group per generation (overrides the tuning file)
    #[arg(long)]
    games_per_individual: Option<u32>,

    /// Path to a TOML tuning file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where to write the JSON evolution report
    #[arg(long, default_value = "output/evolution_report.json")]
    report: PathBuf,

    /// Optional JSONL dump of the showcase match's events
    #[arg(long)]
    match_log: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut tuning = match &args.config {
        Some(path) => match TuningConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load tuning file {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => TuningConfig::default(),
    };
    if let Some(population) = args.population {
        tuning.evolver.population_size = population;
    }
    if let Some(players) = args.players {
        tuning.game.num_players = players;
    }
    if let Some(games) = args.games_per_individual {
        tuning.evolver.games_per_individual = games;
    }

    println!("Mafia Strategy Evolution");
    println!("========================");
    println!("Seed: {}", args.seed);
    println!("Generations: {}", args.generations);
    println!("Population: {}", tuning.evolver.population_size);
    println!("Players per match: {}", tuning.game.num_players);
    println!(
        "Games per individual: {}",
        tuning.evolver.games_per_individual
    );
    println!();

    let mut evolver =
        match Evolver::new(tuning.evolver.clone(), tuning.game.clone(), args.seed) {
            Ok(evolver) => evolver,
            Err(e) => {
                eprintln!("Configuration error: {}", e);
                std::process::exit(1);
            }
        };

    let start = Instant::now();
    let stats = evolver.evolve(args.generations);
    println!(
        "Evolution completed in {:.2} seconds",
        start.elapsed().as_secs_f32()
    );

    for entry in &stats {
        println!(
            "Generation {}: best fitness {:.2}, average fitness {:.2}",
            entry.generation, entry.best_fitness, entry.avg_fitness
        );
    }

    println!();
    println!("Best Individual Traits:");
    for (name, value) in TRAIT_NAMES.iter().zip(evolver.best_genome().as_array()) {
        println!("  {}: {:.4}", name, value);
    }

    println!();
    println!("Running showcase game with evolved agents...");
    let roster = tuning.game.num_players.min(evolver.population().len());
    let mut showcase = MafiaGame::new(
        tuning.game.clone(),
        &evolver.population()[..roster],
        args.seed.wrapping_add(1),
    );
    let outcome = showcase.run();

    println!();
    println!("Game Results:");
    match outcome.winner {
        Some(team) => println!("  Winning Team: {}", team),
        None => println!("  Winning Team: undecided (day cap reached)"),
    }
    println!("  Days Played: {}", outcome.days);

    println!();
    println!("Game Log:");
    for line in showcase.log_lines() {
        println!("  {}", line);
    }

    if let Some(path) = &args.match_log {
        match write_match_log(path, showcase.events()) {
            Ok(()) => println!("Match log written to {}", path.display()),
            Err(e) => eprintln!("Warning: could not write match log: {}", e),
        }
    }

    let report = EvolutionReport {
        seed: args.seed,
        generations: args.generations,
        history: evolver.history().to_vec(),
        showcase: Some(outcome),
    };
    match write_report(&args.report, &report) {
        Ok(()) => println!("Report written to {}", args.report.display()),
        Err(e) => eprintln!("Warning: could not write report: {}", e),
    }
}

fn write_match_log(path: &Path, events: &[MatchEvent]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut logger = MatchLogger::new(path)?;
    logger.log_batch(events)?;
    logger.flush()
}

fn write_report(path: &Path, report: &EvolutionReport) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)
}
