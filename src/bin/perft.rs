use clap::Parser;

use fenboard::board::Board;
use fenboard::fen::STARTING_FEN;
use fenboard::rules::Engine;

/// Count legal move sequences from one or more positions.
#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    /// Positions to count from
    #[clap(value_name = "FEN", default_value = STARTING_FEN)]
    fens: Vec<String>,
    /// Plies to search
    #[clap(short, long, default_value = "1")]
    depth: u32,
    /// Print the count below each root move
    #[clap(long)]
    divide: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    for fen in &cli.fens {
        let mut engine = Engine::new(Board::from_fen(fen)?);
        println!("{fen}");
        if cli.divide && cli.depth > 0 {
            let (_, legal) = engine.current_legal_moves();
            let mut total = 0;
            for mv in &legal {
                let mut child = engine.clone();
                child.commit_move(mv);
                let count = child.perft(cli.depth - 1);
                total += count;
                println!("  {}: {count}", mv.to_uci());
            }
            println!("total: {total}");
        } else {
            println!("depth {}: {}", cli.depth, engine.perft(cli.depth));
        }
    }
    Ok(())
}
