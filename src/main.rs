//! Reversi-MCTS: an Othello move engine.
//!
//! ## Usage
//!
//! - `reversi-mcts` - Show a demo
//! - `reversi-mcts decide [FILE]` - Answer one JSON request from a file or stdin
//! - `reversi-mcts serve` - Answer JSON requests line by line on stdin/stdout
//! - `reversi-mcts selfplay` - Benchmark agents against each other

use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use reversi_mcts::board::Board;
use reversi_mcts::config::SearchConfig;
use reversi_mcts::mcts::tree_search;
use reversi_mcts::protocol::{decide, decode_request, Engine};
use reversi_mcts::selfplay::{play_match, Agent};

/// Reversi-MCTS: an Othello move engine built on Monte Carlo Tree Search
#[derive(Parser)]
#[command(name = "reversi-mcts")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON file with search settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Playouts per rollout batch
    #[arg(long, global = true)]
    sims: Option<u32>,

    /// Search iterations per move
    #[arg(long, global = true)]
    iterations: Option<u32>,

    /// Seed for reproducible searches
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Spread rollouts over all cores
    #[arg(long, global = true)]
    parallel: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the opening position and show the chosen move
    Demo,
    /// Answer one JSON request read from FILE (or stdin)
    Decide { file: Option<PathBuf> },
    /// Answer JSON requests, one per line, until EOF or `quit`
    Serve,
    /// Play a series of games between two agents
    Selfplay {
        #[arg(long, default_value_t = 10)]
        games: u32,
        #[arg(long, value_enum, default_value_t = AgentKind::Mcts)]
        black: AgentKind,
        #[arg(long, value_enum, default_value_t = AgentKind::RandomPlus)]
        white: AgentKind,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum AgentKind {
    Mcts,
    Random,
    RandomPlus,
}

impl AgentKind {
    fn agent(self, config: &SearchConfig) -> Agent {
        match self {
            AgentKind::Mcts => Agent::Mcts(config.clone()),
            AgentKind::Random => Agent::Random,
            AgentKind::RandomPlus => Agent::RandomPlus,
        }
    }
}

fn init_tracing(level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn load_config(cli: &Cli) -> Result<SearchConfig> {
    let mut config = match &cli.config {
        Some(path) => SearchConfig::load(path)?,
        None => SearchConfig::default(),
    };
    if let Some(sims) = cli.sims {
        config.simulations_per_rollout = sims;
    }
    if let Some(iterations) = cli.iterations {
        config.max_iterations = iterations;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    config.parallel_rollouts |= cli.parallel;
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);
    let config = load_config(&cli).context("loading search config")?;

    match &cli.command {
        Some(Commands::Decide { file }) => run_decide(file.as_deref(), &config),
        Some(Commands::Serve) => {
            info!("serving requests on stdin");
            Engine::new(config).run(io::stdin().lock(), io::stdout().lock())?;
            Ok(())
        }
        Some(Commands::Selfplay {
            games,
            black,
            white,
        }) => run_selfplay(*games, *black, *white, &config),
        Some(Commands::Demo) | None => run_demo(&config),
    }
}

fn run_decide(file: Option<&std::path::Path>, config: &SearchConfig) -> Result<()> {
    let body = match file {
        Some(path) => {
            std::fs::read(path).with_context(|| format!("reading {}", path.display()))?
        }
        None => {
            let mut body = Vec::new();
            io::stdin()
                .read_to_end(&mut body)
                .context("reading request from stdin")?;
            body
        }
    };

    let state = decode_request(&body)?;
    let response = decide(&state, config)?;
    println!("{}", serde_json::to_string(&response)?);
    Ok(())
}

fn run_selfplay(
    games: u32,
    black: AgentKind,
    white: AgentKind,
    config: &SearchConfig,
) -> Result<()> {
    let black = black.agent(config);
    let white = white.agent(config);
    let mut rng = match config.seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    };

    info!(games, black = black.name(), white = white.name(), "starting match");
    let tally = play_match(games, &black, &white, &mut rng)?;
    println!("{tally}");
    Ok(())
}

fn run_demo(config: &SearchConfig) -> Result<()> {
    println!("Reversi-MCTS: Othello Monte Carlo Tree Search\n");

    let mut board = Board::fresh_game();
    println!("{board}");

    println!(
        "Running {} iterations x {} playouts...",
        config.max_iterations, config.simulations_per_rollout
    );
    let outcome = tree_search(&board, config)?;
    for child in &outcome.children {
        println!(
            "  {} visits={} wins={} rate={:.3}",
            child.position, child.visits, child.wins, child.win_rate
        );
    }

    let mover = board.turn();
    board.apply_move(outcome.best)?;
    println!("\n{mover} plays {}\n", outcome.best);
    println!("{board}");
    Ok(())
}
