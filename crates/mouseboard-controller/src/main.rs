//! Mouseboard controller entry point.
//!
//! Reads input events from stdin, forwards them to the mouseboard peripheral
//! over the first serial device that answers a `Ping`, and prints link status
//! changes to stderr.
//!
//! # Usage
//!
//! ```text
//! mouseboard [OPTIONS] < events.txt
//!
//! Options:
//!   -c, --config <PATH>        Config file [default: ~/.config/mouseboard/config.toml]
//!       --device <TEMPLATE>    Device path template, e.g. /dev/ttyACM{}
//!       --baud-rate <BAUD>     Serial line speed
//!   -d, --debug                Log at debug level
//!   -s, --log-to-stdout        Print log lines to stdout instead of the status view
//! ```
//!
//! See `infrastructure::input_source::text` for the event line format.
//!
//! # Environment variable overrides
//!
//! | Variable               | Option         |
//! |------------------------|----------------|
//! | `MOUSEBOARD_CONFIG`    | `--config`     |
//! | `MOUSEBOARD_DEVICE`    | `--device`     |
//! | `MOUSEBOARD_BAUD_RATE` | `--baud-rate`  |
//! | `RUST_LOG`             | log filter, overrides `--debug` and `[log] level` |
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config()              -- TOML file + CLI overrides
//!  └─ StatusBoard::new()         -- link snapshot + log ring
//!  └─ TransportSession::start()  -- scan /dev/ttyUSB0..9 for the board
//!  └─ ForwardInputUseCase::run() -- one event at a time from stdin
//!       ├─ key / button / motion -> PeripheralLink -> serial exchange
//!       ├─ hide                  -> stop (release everything)
//!       └─ after each event      -> TerminalPresenter::refresh()
//!  └─ TransportSession::shutdown()
//! ```

use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use mouseboard_controller::application::forward_input::ForwardInputUseCase;
use mouseboard_controller::infrastructure::{
    input_source::TextEventSource,
    serial::{DeviceLocator, DeviceTemplate, NativePortOpener, TransportSession},
    status::{StatusBoard, TerminalPresenter},
    storage::config::{load_config, AppConfig},
};
use mouseboard_core::X11KeyMapper;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Forwards keyboard and mouse input to a mouseboard peripheral.
#[derive(Debug, Parser)]
#[command(name = "mouseboard", version)]
struct Cli {
    /// Configuration file. Must exist when given explicitly.
    #[arg(short, long, env = "MOUSEBOARD_CONFIG")]
    config: Option<PathBuf>,

    /// Device path template with one `{}` placeholder for the index.
    #[arg(long, env = "MOUSEBOARD_DEVICE")]
    device: Option<String>,

    /// Serial line speed.
    #[arg(long, env = "MOUSEBOARD_BAUD_RATE")]
    baud_rate: Option<u32>,

    /// Log at debug level.
    #[arg(short, long)]
    debug: bool,

    /// Print log lines to stdout instead of keeping them for the status view.
    #[arg(short = 's', long)]
    log_to_stdout: bool,
}

impl Cli {
    /// Loads the config file and applies command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// resulting configuration is invalid.
    fn resolve_config(&self) -> anyhow::Result<AppConfig> {
        let mut config = load_config(self.config.as_deref()).context("failed to load config")?;

        if let Some(device) = &self.device {
            config.device.path_template =
                DeviceTemplate::new(device.as_str()).context("invalid --device")?;
        }
        if let Some(baud_rate) = self.baud_rate {
            config.device.baud_rate = baud_rate;
        }
        if self.debug {
            config.log.level = "debug".to_string();
        }

        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

/// Installs the global subscriber: env filter, the status board layer, and
/// optionally a stdout formatter.
fn init_tracing(cli: &Cli, config: &AppConfig, board: &StatusBoard) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log.level));
    let stdout = cli
        .log_to_stdout
        .then(|| tracing_subscriber::fmt::layer().with_writer(io::stdout));

    tracing_subscriber::registry()
        .with(filter)
        .with(board.layer())
        .with(stdout)
        .try_init()
        .context("failed to initialise logging")
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    let board = StatusBoard::new(config.log.capacity);
    init_tracing(&cli, &config, &board)?;
    info!("mouseboard controller starting");

    // ── Transport ─────────────────────────────────────────────────────────────
    let locator = DeviceLocator::new(
        config.device.path_template.clone(),
        config.device.line_settings(),
        Box::new(NativePortOpener),
    )
    .with_max_index(config.device.max_index);
    let mut session = TransportSession::new(
        locator,
        config.input.scroll_distance,
        Box::new(board.clone()),
    );
    if !session.start() {
        warn!(
            "no device answered on {}, retrying with the next event",
            config.device.path_template
        );
    }

    // ── Dispatch loop ─────────────────────────────────────────────────────────
    let mapper = X11KeyMapper::new(config.input.layout_options());
    let mut use_case = ForwardInputUseCase::new(session, mapper);
    let mut presenter = TerminalPresenter::new(board, !cli.log_to_stdout);
    let mut source = TextEventSource::new(io::stdin().lock());

    let result = use_case.run(&mut source, || {
        // Status output is best-effort.
        let _ = presenter.refresh(&mut io::stderr());
    });

    use_case.into_link().shutdown();
    let _ = presenter.refresh(&mut io::stderr());
    info!("mouseboard controller stopped");

    result.context("failed to read input events")
}
