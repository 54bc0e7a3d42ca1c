//! goban-bridge command line.
//!
//! ## Usage
//!
//! - `goban-bridge console` - Drive a session from stdin
//! - `goban-bridge console --backend-url http://127.0.0.1:5000` - Same, posting
//!   to a live backend
//! - `goban-bridge demo` - Let two AI seats play against the built-in advisor

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use goban_bridge::advisor::Advisor;
use goban_bridge::backend::{Backend, TracingBackend};
use goban_bridge::board::{Board, BoardLibrary};
use goban_bridge::bridge::{Bridge, BridgeEvent};
use goban_bridge::config::BridgeConfig;
use goban_bridge::console::Console;
use goban_bridge::constants::DEFAULT_BOARD_SIZE;
use goban_bridge::moves::Color;
use goban_bridge::seats::Controller;

/// Move and turn coordination between a Go board and an analysis backend
#[derive(Parser)]
#[command(name = "goban-bridge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// A log level among "off", "error", "warn", "info", "debug", "trace"
    #[arg(short, long, default_value = "info", global = true)]
    log_level: LevelFilter,

    /// Board size to start with
    #[arg(long, default_value_t = DEFAULT_BOARD_SIZE, global = true)]
    board_size: usize,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Read session commands from stdin
    Console {
        /// Base URL of the backend. Requests are only logged without it.
        #[arg(long)]
        backend_url: Option<String>,
        /// Settle immediately instead of waiting out the delays
        #[arg(long)]
        no_delay: bool,
        /// Leave deferred work queued until `settle` is given
        #[arg(long)]
        manual_settle: bool,
    },
    /// Play a game between two AI seats and the built-in advisor
    Demo {
        /// Moves before the advisor starts passing
        #[arg(long, default_value_t = 40)]
        moves: usize,
        /// Seed for the advisor's move choice
        #[arg(long)]
        seed: Option<u64>,
        /// Have the advisor answer with structured JSON messages
        #[arg(long)]
        structured: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    initialize_logging(cli.log_level);

    let config = BridgeConfig::default().with_board_size(cli.board_size)?;

    match cli.command {
        Some(Commands::Console {
            backend_url,
            no_delay,
            manual_settle,
        }) => {
            let mut config = config.with_backend_url(backend_url);
            if no_delay {
                config = config.without_delays();
            }
            run_console(config, manual_settle)
        }
        Some(Commands::Demo {
            moves,
            seed,
            structured,
        }) => run_demo(config, moves, seed.unwrap_or_else(|| fastrand::u64(..)), structured),
        None => run_demo(config, 40, fastrand::u64(..), false),
    }
}

fn initialize_logging(level: LevelFilter) {
    let format = tracing_subscriber::fmt::format()
        .with_target(false)
        .compact();

    let filter = Targets::new().with_default(level);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(format)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

fn connect(config: &BridgeConfig) -> anyhow::Result<Box<dyn Backend>> {
    let Some(url) = &config.backend_url else {
        return Ok(Box::new(TracingBackend));
    };
    #[cfg(feature = "http")]
    {
        let backend = goban_bridge::backend::HttpBackend::new(url, config.request_timeout)
            .with_context(|| format!("connecting to {url}"))?;
        info!(%url, "Posting to backend");
        Ok(Box::new(backend))
    }
    #[cfg(not(feature = "http"))]
    {
        anyhow::bail!("cannot reach {url}: built without the `http` feature")
    }
}

fn run_console(config: BridgeConfig, manual_settle: bool) -> anyhow::Result<()> {
    let backend = connect(&config)?;
    let mut console = Console::new(backend, config);
    if manual_settle {
        console = console.manual_settle();
    }
    console.run().context("console I/O failed")
}

fn run_demo(config: BridgeConfig, moves: usize, seed: u64, structured: bool) -> anyhow::Result<()> {
    info!(seed, moves, size = config.board_size(), "Starting demo");
    let config = config.without_delays();
    let advisor = Advisor::new(config.board_size(), seed, moves).structured(structured);
    let mut bridge = Bridge::new(Board::new(config.board_size()), advisor, config);

    for color in [Color::Black, Color::White] {
        bridge.dispatch(BridgeEvent::SeatSelected {
            color,
            controller: Controller::Ai,
        })?;
    }

    // Each round delivers the advisor's replies, which relay a move and
    // trigger the next request. The game ends when the advisor falls silent.
    let max_rounds = 4 * (moves + 2);
    for _ in 0..max_rounds {
        bridge.run_pending()?;
        let messages = bridge.backend_mut().take_messages();
        if messages.is_empty() {
            break;
        }
        for raw in messages {
            match raw.parse() {
                Ok(event) => bridge.dispatch(BridgeEvent::Push(event))?,
                Err(err) => warn!(?raw, %err, "Dropping unreadable push"),
            }
        }
    }

    let size = bridge.board().size();
    println!("{}", bridge.board());
    for (number, mv) in bridge.turn().moves().iter().enumerate() {
        println!("{:>3}. {}", number + 1, mv.log_line(size));
    }
    println!("{}", bridge.view());
    println!("{}", bridge.status_line());
    Ok(())
}
