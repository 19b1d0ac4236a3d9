use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Parser;
use draftosaurus::{PlayerId, Ruleset, ValidationCoordinator};
use rand::rngs::StdRng;
use rand::SeedableRng;
use referee::{play_game, GameConfig, GameResult, Recorder};
use tracing::{debug, info};
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Plays games between bots and checks every move they make.
#[derive(Parser)]
struct Args {
    /// How many games to play
    #[arg(short, long, default_value_t = 100)]
    num_games: usize,

    /// How many players take part in each game
    #[arg(short, long, default_value_t = 2, value_parser = clap::value_parser!(u32).range(2..=3))]
    players: u32,

    /// How many drafts of six rounds each game has
    #[arg(short, long, default_value_t = 2)]
    drafts: u32,

    /// RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// A JSON ruleset file. The standard rules are used if this is not given.
    #[arg(long)]
    ruleset: Option<PathBuf>,

    /// Stop the tournament as soon as one player makes an illegal move
    #[arg(short, long, default_value_t = false)]
    stop_on_illegal_move: bool,

    /// Record the games as JSON files into this directory
    #[arg(short, long)]
    record_games_to_directory: Option<PathBuf>,

    /// A log level among "off", "error", "warn", "info", "debug", "trace"
    #[arg(short, long, default_value = "info")]
    log_level: LevelFilter,
}

#[derive(Default)]
struct TournamentScore {
    games: usize,
    wins: BTreeMap<PlayerId, usize>,
    illegal_moves: BTreeMap<PlayerId, usize>,
    ties: usize,
    points: BTreeMap<PlayerId, u64>,
}

fn play_tournament(
    config: GameConfig,
    coordinator: &ValidationCoordinator,
    num_games: usize,
    rng: &mut StdRng,
    stop_on_illegal_move: bool,
    recorder: &mut Option<Recorder>,
) -> anyhow::Result<TournamentScore> {
    let mut score = TournamentScore::default();

    for game_idx in 0..num_games {
        score.games += 1;
        match play_game(rng, config, coordinator, recorder)? {
            GameResult::Finished {
                scores, winners, ..
            } => {
                for (player, report) in &scores {
                    *score.points.entry(*player).or_default() += u64::from(report.total);
                }
                if let [winner] = winners.as_slice() {
                    debug!(winner, game_idx);
                    *score.wins.entry(*winner).or_default() += 1;
                } else {
                    debug!(game_idx, ?winners, "Tie");
                    score.ties += 1;
                }
            }
            GameResult::IllegalMoveByPlayer { player, err } => {
                info!(player, game_idx, "Illegal move by player");
                let mut err_dyn = &err as &dyn std::error::Error;
                while let Some(src_err) = err_dyn.source() {
                    info!("{}", err_dyn);
                    err_dyn = src_err;
                }
                info!("{}", err_dyn);
                *score.illegal_moves.entry(player).or_default() += 1;
                if stop_on_illegal_move {
                    break;
                }
            }
        }
    }

    Ok(score)
}

fn print_tournament_results(config: GameConfig, score: &TournamentScore) {
    println!("\nResults after {} games:\n", score.games);
    println!(" {:8} | {:>6} | {:>13} | {:>10}", "player", "wins", "illegal moves", "avg points");
    println!("----------|--------|---------------|-----------");
    for player in config.players() {
        let wins = score.wins.get(&player).copied().unwrap_or(0);
        let illegal_moves = score.illegal_moves.get(&player).copied().unwrap_or(0);
        let points = score.points.get(&player).copied().unwrap_or(0);
        let finished_games = score.games - score.illegal_moves.values().sum::<usize>();
        let avg_points = if finished_games > 0 {
            points as f32 / finished_games as f32
        } else {
            0.0
        };
        println!(
            " {:8} | {:>6} | {:>13} | {:>10.1}",
            player, wins, illegal_moves, avg_points
        );
    }
    println!("\n{} ties", score.ties);
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    initialize_logging(args.log_level);

    // Get a random seed
    let seed = args.seed.unwrap_or_else(rand::random);
    info!(seed);
    let mut rng = StdRng::seed_from_u64(seed);

    let ruleset = match &args.ruleset {
        Some(path) => Ruleset::load(path)?,
        None => Ruleset::standard(),
    };
    let coordinator = ValidationCoordinator::new(ruleset);
    let config = GameConfig::new(args.players, args.drafts)?;

    let mut recorder = if let Some(dir_path) = args.record_games_to_directory {
        Some(Recorder::new(dir_path)?)
    } else {
        None
    };

    let score = play_tournament(
        config,
        &coordinator,
        args.num_games,
        &mut rng,
        args.stop_on_illegal_move,
        &mut recorder,
    )?;

    print_tournament_results(config, &score);

    Ok(())
}

/// Logs go to stderr, the results to stdout.
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
