//! Wordle suggestion service - CLI
//!
//! `serve` runs the SSE suggestion API; `suggest` answers a single
//! query on the command line. Both load the answer and guess universes
//! from plain-text word lists at startup.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use wordle_suggest::adapter::{self, AppState};
use wordle_suggest::core::{Feedback, GuessEntry, Word};
use wordle_suggest::engine::{CancelToken, Engine, EngineConfig, Policy};
use wordle_suggest::session::SessionConfig;
use wordle_suggest::wordlists::load_words;

#[derive(Parser)]
#[command(
    name = "wordle_suggest",
    about = "Wordle assistant: ranked next-guess suggestions by information gain",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the answer word list (one word per line)
    #[arg(long, global = true, default_value = "data/answers.txt")]
    answers: String,

    /// Path to the allowed-guess word list (one word per line)
    #[arg(long, global = true, default_value = "data/guesses.txt")]
    guesses: String,

    /// Worker threads (default: min(max(cores - 1, 1), 8))
    #[arg(long, global = true)]
    workers: Option<usize>,

    /// Shards per request (default: 4)
    #[arg(long, global = true)]
    shards: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the SSE suggestion server
    Serve {
        /// Listen address
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: SocketAddr,

        /// Per-request wall-clock budget in seconds
        #[arg(long, default_value = "30")]
        timeout: u64,
    },

    /// Compute suggestions for one position and exit
    Suggest {
        /// History entries as WORD=COLORS, e.g. SLATE=BBGYB
        /// (G green, Y yellow, B gray)
        history: Vec<String>,

        /// Only suggest guesses consistent with the history
        #[arg(short, long)]
        strict: bool,

        /// Only suggest guesses starting with this prefix
        #[arg(short, long, default_value = "")]
        prefix: String,

        /// Number of suggestions to print
        #[arg(short = 'k', long, default_value = "5")]
        top_k: usize,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let engine_config = EngineConfig {
        workers: cli.workers,
        shard_count: cli.shards,
    };
    let engine = build_engine(&cli.answers, &cli.guesses, engine_config)?;

    match cli.command {
        Commands::Serve { addr, timeout } => run_serve(engine, addr, timeout),
        Commands::Suggest {
            history,
            strict,
            prefix,
            top_k,
        } => run_suggest(&engine, &history, strict, prefix, top_k),
    }
}

fn build_engine(answers: &str, guesses: &str, config: EngineConfig) -> Result<Engine> {
    let answer_words =
        load_words(answers).with_context(|| format!("loading answers from {answers}"))?;
    let guess_words =
        load_words(guesses).with_context(|| format!("loading guesses from {guesses}"))?;

    log::info!(
        "loaded {} answers and {} guesses",
        answer_words.len(),
        guess_words.len()
    );

    Engine::new(answer_words, guess_words, config).map_err(|e| anyhow!(e))
}

fn run_serve(engine: Engine, addr: SocketAddr, timeout: u64) -> Result<()> {
    let state = AppState::new(
        Arc::new(engine),
        SessionConfig {
            timeout: Duration::from_secs(timeout),
        },
    );

    let runtime = tokio::runtime::Runtime::new().context("building async runtime")?;
    runtime
        .block_on(adapter::serve(addr, state))
        .with_context(|| format!("serving on {addr}"))
}

fn run_suggest(
    engine: &Engine,
    history: &[String],
    strict: bool,
    prefix: String,
    top_k: usize,
) -> Result<()> {
    let history = parse_history(history)?;
    let policy = Policy {
        strict_guesses: strict,
        typed_prefix: prefix,
        top_k,
    }
    .normalize();

    let report = engine
        .suggest(&history, &policy, &CancelToken::new(), None)
        .map_err(|e| anyhow!(e))?;

    println!("{} answers remain", report.remaining_answers);
    if report.ranked.is_empty() {
        println!("no candidate guesses under the active filters");
        return Ok(());
    }

    for scored in &report.ranked {
        if scored.score.is_infinite() {
            println!("  {}  guaranteed", scored.word);
        } else {
            println!("  {}  {:.4} bits", scored.word, scored.score);
        }
    }
    Ok(())
}

/// Parse WORD=COLORS entries into history order
fn parse_history(entries: &[String]) -> Result<Vec<GuessEntry>> {
    entries
        .iter()
        .map(|entry| {
            let (word, colors) = entry
                .split_once('=')
                .ok_or_else(|| anyhow!("expected WORD=COLORS, got {entry:?}"))?;
            let guess = Word::new(word).with_context(|| format!("in entry {entry:?}"))?;
            let feedback = Feedback::parse(colors)
                .ok_or_else(|| anyhow!("bad colors in {entry:?}: use G, Y, B"))?;
            Ok(GuessEntry::new(guess, feedback))
        })
        .collect()
}
