use std::io::{self, Write};

use clap::Parser;
use sweep::engine::{Board, GameConfig, RevealResult, Status};
use sweep::tui;

#[derive(Parser, Debug)]
#[command(name = "sweep", about = "Terminal Minesweeper", version)]
struct Args {
    /// Launch TUI mode
    #[arg(long)]
    tui: bool,
    /// Board width
    #[arg(long, default_value_t = 10)]
    width: usize,
    /// Board height
    #[arg(long, default_value_t = 10)]
    height: usize,
    /// Number of mines
    #[arg(long, default_value_t = 15)]
    mines: usize,
    /// Seed (0 = random)
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn print_help() {
    println!("Commands:");
    println!("  r x y   - reveal cell at column x, row y (1-based)");
    println!("  f x y   - toggle flag at x, y (1-based)");
    println!("  n       - restart with the same settings");
    println!("  q       - quit");
    println!("  h/help  - show this help");
}

fn parse_coords(parts: &[&str]) -> Result<(usize, usize), &'static str> {
    if parts.len() < 3 { return Err("Usage: <cmd> x y"); }
    let x = parts[1].parse::<usize>().map_err(|_| "Invalid x")?;
    let y = parts[2].parse::<usize>().map_err(|_| "Invalid y")?;
    if x == 0 || y == 0 { return Err("Use 1-based coordinates"); }
    Ok((x - 1, y - 1))
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let config = GameConfig::new(args.width, args.height, args.mines).with_seed(args.seed);
    let mut board = Board::new(config)?;
    log::debug!("starting {:?}", board.config());

    if args.tui {
        tui::run_tui(board)?;
        return Ok(());
    }

    println!("Minesweeper {}x{} with {} mines{}", args.width, args.height, args.mines, if args.seed != 0 { format!(" (seed {})", args.seed) } else { String::new() });
    println!("Coordinates are 1-based. Type 'h' for help.");
    print_help();

    let mut input = String::new();
    let mut announced = false;
    loop {
        match board.status() {
            Status::Playing => {
                announced = false;
                println!("\nMines left: {}\n{}", board.remaining_mines(), board);
            }
            status if !announced => {
                announced = true;
                if status == Status::Lost {
                    println!("\nBoom! You hit a mine. Game over.");
                } else {
                    println!("\nCongratulations! You cleared the board!");
                }
                println!("Final board (mines shown):\n{}", board.render(true, true));
                println!("Type 'n' to play again or 'q' to quit.");
            }
            _ => {}
        }

        print!("> ");
        io::stdout().flush()?;
        input.clear();
        if io::stdin().read_line(&mut input)? == 0 { break; }
        let line = input.trim();
        if line.is_empty() { continue; }

        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts[0].to_lowercase().as_str() {
            "q" | "quit" | "exit" => break,
            "h" | "help" => print_help(),
            "n" | "new" | "restart" => board.restart(),
            "r" | "reveal" => match parse_coords(&parts) {
                Ok((x, y)) => {
                    if board.reveal(x, y) == RevealResult::NoOp && board.status() == Status::Playing {
                        println!("Nothing to reveal there");
                    }
                }
                Err(msg) => println!("{}", msg),
            },
            "f" | "flag" => match parse_coords(&parts) {
                Ok((x, y)) => {
                    if !board.toggle_flag(x, y) { println!("Cannot flag that cell"); }
                }
                Err(msg) => println!("{}", msg),
            },
            other => {
                println!("Unknown command '{}'. Type 'h' for help.", other);
            }
        }
    }
    Ok(())
}
