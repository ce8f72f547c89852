use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

use fenboard::board::RulesConfig;
use fenboard::fen::STARTING_FEN;
use fenboard::game::Game;
use fenboard::history::History;

/// Play random legal moves from a position until the game ends.
#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    /// Starting position
    #[clap(long, default_value = STARTING_FEN)]
    fen: String,
    /// Resume from a history file instead of --fen
    #[clap(long, value_name = "PATH")]
    resume: Option<PathBuf>,
    /// Write the played positions to this file, one FEN per line
    #[clap(long, value_name = "PATH")]
    history: Option<PathBuf>,
    /// Seed for the move picker
    #[clap(long)]
    seed: Option<u64>,
    /// Stop after this many plies
    #[clap(long, default_value = "300")]
    max_plies: u32,
    /// Count the half-move clock per ply with a 100-ply draw limit
    #[clap(long)]
    per_ply_clock: bool,
    /// Print the final position as JSON instead of a diagram
    #[clap(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = if cli.per_ply_clock {
        RulesConfig::standard()
    } else {
        RulesConfig::default()
    };
    let mut game = match &cli.resume {
        Some(path) => {
            let history = History::load(path)
                .with_context(|| format!("reading history {}", path.display()))?;
            let mut game = Game::from_history(history, config)?;
            game.jump_to_end()?;
            game
        }
        None => Game::with_config(&cli.fen, config)?,
    };
    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut plies = 0;
    while plies < cli.max_plies {
        let Some(mv) = game.random_move(&mut rng) else {
            break;
        };
        game.perform_turn(mv)?;
        plies += 1;
    }

    if let Some(path) = &cli.history {
        game.save_history(path)
            .with_context(|| format!("writing history {}", path.display()))?;
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&game.snapshot())?);
    } else {
        println!("{}", game.board());
        println!("{}", game.board().to_fen());
    }
    eprintln!("Stopped after {plies} plies: {:?}", game.state());
    Ok(())
}
