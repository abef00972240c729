mod config;
mod offline;

use std::path::PathBuf;
use clap::Parser;
use common::{log, logger};
use config::{get_config_manager, GameType};
use offline::run_snake_games;

#[derive(Parser)]
#[command(name = "snake_arcade")]
struct Args {
    /// Config file; defaults to snake_arcade_config.yaml next to the executable.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides the mode stored in the config.
    #[arg(long, value_enum)]
    mode: Option<GameType>,

    #[arg(long, default_value_t = 1)]
    games: usize,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    use_log_prefix: bool,

    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let prefix = if args.use_log_prefix {
        Some("Snake".to_string())
    } else {
        None
    };
    logger::init_logger(prefix, args.verbose);

    let config = get_config_manager(args.config).get_config()?;
    let mode = args.mode.unwrap_or(config.mode);
    let settings = config.session_settings(mode)?;

    if args.games == 0 {
        log!("Nothing to play");
        return Ok(());
    }

    log!("Playing {} {:?} game(s)", args.games, mode);
    let report = run_snake_games(settings, args.games, args.seed).await?;

    if let Some(best) = report.games.iter().max_by_key(|game| game.score) {
        println!(
            "Best score {} over {} game(s)",
            best.score,
            report.games.len()
        );
    }

    Ok(())
}
