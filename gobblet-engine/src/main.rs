//! Gobblet engine CLI
//!
//! Reads a position as JSON (or starts a new game), chooses a move within
//! the time budget and prints it as JSON on stdout. Logs go to stderr.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use gobblet_core::{GameState, MoveRecord, StateRecord};
use gobblet_engine::{CacheMode, Engine, EngineConfig};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CacheArg {
    Window,
    Bounded,
    Off,
}

impl From<CacheArg> for CacheMode {
    fn from(arg: CacheArg) -> Self {
        match arg {
            CacheArg::Window => CacheMode::Window,
            CacheArg::Bounded => CacheMode::Bounded,
            CacheArg::Off => CacheMode::Disabled,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Position to search, as a JSON state record ("-" reads stdin).
    /// Omit to start from the initial position.
    #[arg(short, long)]
    state: Option<PathBuf>,

    /// Time budget in seconds
    #[arg(short, long, default_value_t = 10.0)]
    time: f64,

    /// Engine configuration as JSON; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Transposition table scheme
    #[arg(long, value_enum)]
    cache: Option<CacheArg>,

    /// Deepest iteration to start
    #[arg(long)]
    max_depth: Option<u32>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn read_input(path: &PathBuf) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut input = String::new();
        io::stdin().read_to_string(&mut input).context("failed to read stdin")?;
        Ok(input)
    } else {
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
    }
}

fn load_state(path: Option<&PathBuf>) -> Result<GameState> {
    let Some(path) = path else {
        return Ok(GameState::new());
    };
    let record: StateRecord =
        serde_json::from_str(&read_input(path)?).context("malformed state record")?;
    GameState::try_from(&record).context("invalid state record")
}

fn load_config(args: &Args) -> Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => serde_json::from_str(&read_input(path)?).context("malformed engine config")?,
        None => EngineConfig::default(),
    };
    if let Some(cache) = args.cache {
        config.cache = cache.into();
    }
    if let Some(max_depth) = args.max_depth {
        config.max_depth = max_depth;
    }
    Ok(config)
}

/// "player N won on (r, c) ..." for a decided position.
fn describe_win(state: &GameState) -> Option<String> {
    let (winner, line) = state.winning_line()?;
    let cells: Vec<String> = line.iter().map(|pos| pos.to_string()).collect();
    Some(format!("player {} won on {}", winner, cells.join(" ")))
}

fn run(args: &Args) -> Result<()> {
    let state = load_state(args.state.as_ref())?;
    let config = load_config(args)?;
    let budget = Duration::try_from_secs_f64(args.time)
        .with_context(|| format!("invalid time budget {}", args.time))?;

    let engine = Engine::new(config);
    log::debug!("engine config: {:?}", engine.config());
    let chosen = engine.choose_move(&state, budget).context("search failed")?;
    if chosen.is_none() {
        if let Some(summary) = describe_win(&state) {
            log::info!("{}", summary);
        }
    }

    let output = serde_json::to_string(&chosen.map(MoveRecord::from))?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", output)?;
    Ok(())
}

fn main() {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .target(env_logger::Target::Stderr)
        .init();

    if let Err(e) = run(&args) {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}
