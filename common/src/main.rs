use clap::Parser;
use minesweeper_ai::{
    Board, Cell, CellView, Dimensions, GameConfig, GameState, MineField, Outcome, Session, Strategy,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::thread;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "minesweeper-ai",
    about = "Autonomous minesweeper bot driven by a logical knowledge base"
)]
struct Args {
    /// Number of rows on the board.
    #[arg(long, default_value_t = GameConfig::default().height)]
    height: usize,

    /// Number of columns on the board.
    #[arg(long, default_value_t = GameConfig::default().width)]
    width: usize,

    /// Number of mines hidden on the board.
    #[arg(long, default_value_t = GameConfig::default().mines)]
    mines: usize,

    /// Seed for the mine layout and for guesses.
    #[arg(long)]
    seed: Option<u64>,

    /// Pause between moves, to make the game watchable.
    #[arg(long, default_value_t = 500)]
    delay_ms: u64,

    /// Check every deduction against the SAT oracle.
    #[arg(long)]
    audit: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    // --- 1. Initialization ---
    let config = GameConfig {
        height: args.height,
        width: args.width,
        mines: args.mines,
    };
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let mut session = Session::new(Board::generate(&config, &mut rng)?);
    let delay = Duration::from_millis(args.delay_ms);

    println!("--- Autonomous Minesweeper Bot ---");
    println!("Strategy: Prioritize logically safe moves, guess randomly otherwise.");
    print_board(&session);

    // --- 2. Game Loop ---
    while session.state() == GameState::Playing {
        println!("\n--- Move #{} ---", session.turns() + 1);

        let Some(turn) = session.step(&mut rng)? else {
            println!("No valid moves left for the bot to make.");
            break;
        };

        match turn.strategy {
            Strategy::Inferred => println!("Logic found a guaranteed safe cell."),
            Strategy::Guess => println!("No logically safe move found. Made a random guess..."),
        }
        println!("Bot reveals {}...", turn.cell);
        if let Outcome::Revealed { count, propagation } = &turn.outcome {
            println!(
                "Clue {count}: {} new safe, {} new mines in {} passes.",
                propagation.new_safes.len(),
                propagation.new_mines.len(),
                propagation.passes
            );
        }
        print_board(&session);

        if args.audit {
            let audit = session.audit()?;
            if !audit.is_complete() {
                tracing::warn!(
                    missed_mines = audit.missed_mines.len(),
                    missed_safes = audit.missed_safes.len(),
                    "knowledge base is behind the oracle"
                );
            }
        }

        thread::sleep(delay);
    }

    // --- 3. Final Result ---
    println!("\n--- Game Over ---");

    match session.state() {
        GameState::Won => println!("Result: The bot won!"),
        GameState::Lost => println!("Result: The bot hit a mine and lost."),
        GameState::Playing => println!("Result: The game ended unexpectedly."),
    }
    println!("Mines:\n{}", session.board());

    Ok(())
}

fn print_board(session: &Session) {
    let Dimensions { height, width } = session.board().dimensions();

    // Print header
    print!("   ");
    for col in 0..width {
        print!("{:^3}", col);
    }
    println!("\n  +{}", "---".repeat(width));

    // Print rows
    for row in 0..height {
        print!("{:^2}|", row);
        for col in 0..width {
            let display = match session.view(Cell::new(row, col)) {
                CellView::Hidden => " ■ ".to_string(),
                CellView::Safe => " . ".to_string(),
                CellView::Flagged => " F ".to_string(),
                CellView::Exploded => " * ".to_string(),
                CellView::Revealed(n) => format!(" {} ", n),
            };
            print!("{}", display);
        }
        println!();
    }
    println!();
}
