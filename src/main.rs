use std::io::{self, BufRead, Write};

use clap::Parser;
use log::info;
use sokoban_engine::{
    Appearance, Direction, Game, GameConfig, GameError, MoveRejection, TextLevelProvider,
};

#[derive(Parser)]
#[command(name = "sokoban-engine")]
#[command(about = "Play Sokoban in the terminal", long_about = None)]
struct Args {
    /// Board width
    #[arg(short = 'W', long, default_value = "7")]
    width: usize,

    /// Board height
    #[arg(short = 'H', long, default_value = "7")]
    height: usize,

    /// Number of boxes
    #[arg(short, long, default_value = "2")]
    boxes: usize,

    /// Seed for the level generator
    #[arg(short, long)]
    seed: Option<u64>,

    /// JSON configuration file; overrides the size flags
    #[arg(short, long, value_name = "FILE", conflicts_with = "levels")]
    config: Option<String>,

    /// Path to a levels file (XSB format)
    #[arg(short, long, value_name = "FILE")]
    levels: Option<String>,

    /// Level number to play from the levels file (1-indexed)
    #[arg(short = 'n', long, default_value = "1", requires = "levels")]
    level: usize,

    /// Render with XSB characters instead of emoji
    #[arg(long)]
    ascii: bool,
}

enum Command {
    Move(Direction),
    Reset,
    Quit,
}

fn parse_command(input: &str) -> Option<Command> {
    match input.trim() {
        "w" | "k" => Some(Command::Move(Direction::Up)),
        "s" | "j" => Some(Command::Move(Direction::Down)),
        "a" | "h" => Some(Command::Move(Direction::Left)),
        "d" | "l" => Some(Command::Move(Direction::Right)),
        "r" => Some(Command::Reset),
        "q" => Some(Command::Quit),
        _ => None,
    }
}

fn load_game(args: &Args) -> Result<Game, GameError> {
    let appearance = if args.ascii {
        Appearance::ascii()
    } else {
        Appearance::default()
    };

    if let Some(path) = &args.levels {
        let levels = TextLevelProvider::from_file(path)?;
        let Some(grid) = args.level.checked_sub(1).and_then(|i| levels.get(i)) else {
            return Err(GameError::InvalidLevel(format!(
                "Level {} not found (file contains {} levels)",
                args.level,
                levels.len()
            )));
        };
        return Game::from_grid(grid.clone(), appearance);
    }

    let mut config = match &args.config {
        Some(path) => GameConfig::from_file(path)?,
        None => GameConfig::new(args.width, args.height).with_boxes(args.boxes),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.ascii {
        config.appearance = appearance;
    }
    Game::new(&config)
}

fn print_board(game: &Game) {
    print!("{}", game.render());
    println!("moves: {}", game.moves());
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut game = match load_game(&args) {
        Ok(game) => game,
        Err(e) => {
            eprintln!("Error creating game: {}", e);
            std::process::exit(1);
        }
    };

    println!("w/a/s/d or k/h/j/l to move, r to reset, q to quit");
    print_board(&game);

    let stdin = io::stdin();
    let mut input = String::new();
    loop {
        print!("> ");
        if io::stdout().flush().is_err() {
            break;
        }
        input.clear();
        match stdin.lock().read_line(&mut input) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {}", e);
                std::process::exit(1);
            }
        }

        match parse_command(&input) {
            Some(Command::Move(direction)) => match game.move_player(direction) {
                Ok(report) => {
                    print_board(&game);
                    if report.won {
                        println!(
                            "Solved in {} moves! Press r to play again or q to quit.",
                            game.moves()
                        );
                    }
                }
                Err(MoveRejection::GameAlreadyWon) => {
                    println!("Already solved. Press r to play again or q to quit.");
                }
                Err(rejection) => println!("Can't move {}: {}", direction, rejection),
            },
            Some(Command::Reset) => {
                game.reset();
                print_board(&game);
            }
            Some(Command::Quit) => break,
            None => println!("Unknown command: {:?}", input.trim()),
        }
    }

    info!("Exiting after {} moves", game.moves());
}
