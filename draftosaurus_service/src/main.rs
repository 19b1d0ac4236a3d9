use std::path::PathBuf;

use clap::Parser;
use draftosaurus::Ruleset;
use draftosaurus_service::RulesService;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Answers rule requests, one JSON object per line on stdin, one response per
/// line on stdout.
#[derive(Parser)]
struct Args {
    /// RNG seed for the bot
    #[arg(long)]
    seed: Option<u64>,

    /// A JSON ruleset file. The standard rules are used if this is not given.
    #[arg(long)]
    ruleset: Option<PathBuf>,

    /// A log level among "off", "error", "warn", "info", "debug", "trace"
    #[arg(short, long, default_value = "info")]
    log_level: LevelFilter,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    initialize_logging(args.log_level);

    let seed = args.seed.unwrap_or_else(rand::random);
    info!(seed);

    let ruleset = match &args.ruleset {
        Some(path) => {
            info!(path = %path.display(), "Loading ruleset");
            Ruleset::load(path)?
        }
        None => Ruleset::standard(),
    };

    let mut service = RulesService::new(ruleset, StdRng::seed_from_u64(seed));
    service.run(std::io::stdin().lock(), std::io::stdout().lock())
}

/// Logs go to stderr, stdout is reserved for responses.
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
