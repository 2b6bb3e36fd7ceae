use clap::Parser;
use connect_twist::config::GameConfig;
use connect_twist::engine::PlayerId;
use connect_twist::game::{Game, Outcome, ScoreChange};
use connect_twist::moves::MoveKind;
use connect_twist::utils::{parse_column, validate_username};
use std::io::{self, Write}; // For input/output
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};
use tracing::Level;

/// Play a gravity-drop connect game in the terminal. Connect size and obstacle size are not asked for at startup: set them with --connect and --obstacle-rows/--obstacle-cols, or in a --config TOML file.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Path to a TOML game config; flags below override its values
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Number of rows on the board
    #[clap(long)]
    rows: Option<usize>,

    /// Number of columns on the board
    #[clap(long)]
    cols: Option<usize>,

    /// Height of the obstacle block (0 for no obstacle)
    #[clap(long)]
    obstacle_rows: Option<usize>,

    /// Width of the obstacle block (0 for no obstacle)
    #[clap(long)]
    obstacle_cols: Option<usize>,

    /// Discs in a row needed to score a point
    #[clap(long)]
    connect: Option<usize>,

    /// Number of players
    #[clap(short, long)]
    players: Option<usize>,

    /// Seconds each player has to enter a move
    #[clap(short, long)]
    time_limit: Option<u64>,

    /// Seed for obstacle placement
    #[clap(long)]
    seed: Option<u64>,

    /// Log engine events to stderr
    #[clap(short, long)]
    verbose: bool,

    /// Print the default config as TOML and exit
    #[clap(long)]
    print_default_config: bool,
}

impl Args {
    fn to_config(&self) -> Result<GameConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => GameConfig::load(path)?,
            None => GameConfig::default(),
        };
        if let Some(rows) = self.rows {
            config.rows = rows;
        }
        if let Some(cols) = self.cols {
            config.cols = cols;
        }
        if let Some(obstacle_rows) = self.obstacle_rows {
            config.obstacle_rows = obstacle_rows;
        }
        if let Some(obstacle_cols) = self.obstacle_cols {
            config.obstacle_cols = obstacle_cols;
        }
        if let Some(connect) = self.connect {
            config.connect_size = connect;
        }
        if let Some(players) = self.players {
            config.players = players;
        }
        if let Some(time_limit) = self.time_limit {
            config.move_time_limit_secs = time_limit;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config.validate()?;
        Ok(config)
    }
}

fn yellow(text: &str) -> String {
    format!("\x1b[1;33m{}\x1b[0m", text)
}

/// What a player did with their turn.
enum TurnInput {
    Move(MoveKind, usize),
    TimedOut,
    Quit,
}

/// Prints `message` and reads one trimmed line. `None` means stdin closed.
fn prompt(message: &str) -> io::Result<Option<String>> {
    print!("{}", message);
    io::stdout().flush()?; // Ensure prompt is shown before input

    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim().to_string()))
}

fn ask_username(id: PlayerId) -> io::Result<Option<String>> {
    let default = format!("Player {}", id);
    loop {
        let Some(input) = prompt(&id.paint(&format!("Enter a username for player {}\n: ", id)))? else {
            return Ok(None);
        };
        match validate_username(&input, &default) {
            Ok(name) => return Ok(Some(name)),
            Err(e) => println!("{}", yellow(&e.to_string())),
        }
    }
}

fn seconds_left(started: Instant, limit: Duration) -> String {
    format!("{:.1}", limit.saturating_sub(started.elapsed()).as_secs_f64())
}

/// Collects a move type and column. The turn is lost once `limit` has
/// passed since `started`, checked after every line the player enters.
fn ask_move(name: &str, id: PlayerId, cols: usize, started: Instant, limit: Duration) -> io::Result<TurnInput> {
    let kind = loop {
        let message = format!(
            "{}, You have {} seconds left to select a move type.\n{}",
            name,
            yellow(&seconds_left(started, limit)),
            id.paint("([N]ormal, [p]op, [s]pecial): ")
        );
        let Some(input) = prompt(&message)? else {
            return Ok(TurnInput::Quit);
        };
        if started.elapsed() > limit {
            return Ok(TurnInput::TimedOut);
        }
        match input.parse::<MoveKind>() {
            Ok(kind) => break kind,
            Err(e) => println!("{}", yellow(&e.to_string())),
        }
    };

    loop {
        let message = format!(
            "{}, You have {} seconds left to select the column for your move.\n{}",
            name,
            yellow(&seconds_left(started, limit)),
            id.paint(&format!("(1-{}): ", cols))
        );
        let Some(input) = prompt(&message)? else {
            return Ok(TurnInput::Quit);
        };
        if started.elapsed() > limit {
            return Ok(TurnInput::TimedOut);
        }
        match parse_column(&input, cols) {
            Ok(column) => return Ok(TurnInput::Move(kind, column)),
            Err(e) => println!("{}", yellow(&e.to_string())),
        }
    }
}

fn plural(n: u32) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

fn announce_changes(changes: &[ScoreChange], names: &[String]) {
    for change in changes {
        let name = &names[change.player.get() as usize - 1];
        let new = yellow(&change.new.to_string());
        if change.gained() > 0 {
            let gained = change.gained();
            println!(
                "{} gained {} point{}, They now have {} points.",
                name,
                yellow(&gained.to_string()),
                plural(gained),
                new
            );
        } else if change.lost() > 0 {
            let lost = change.lost();
            println!(
                "{} lost {} point{}. They now have {} points.",
                name,
                yellow(&lost.to_string()),
                plural(lost),
                new
            );
        }
    }
}

fn announce_outcome(outcome: &Outcome, names: &[String]) {
    let name_of = |id: &PlayerId| names[id.get() as usize - 1].clone();
    match outcome {
        Outcome::Winner { player, score } => {
            println!("Game finished, {} won with {}!", name_of(player), score);
        }
        Outcome::Tie { players, score } => {
            let mut tied: Vec<String> = players.iter().map(name_of).collect();
            let last = tied.pop().unwrap_or_default();
            println!(
                "Game finished, tie between {} and {} at {} points.",
                tied.join(", "),
                last,
                score
            );
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.to_config()?;
    let mut game = Game::from_config(&config)?;
    let limit = config.move_time_limit();

    println!("{}", "*".repeat(60));
    println!(" If you do not see colour, please use a different terminal.");
    println!("{}", "*".repeat(60));

    let mut names = Vec::with_capacity(config.players);
    for id in game.players().ids() {
        let Some(name) = ask_username(id)? else {
            println!("{}", yellow("Exiting..."));
            return Ok(());
        };
        names.push(id.paint(&name));
    }

    println!("{}", game.grid().to_ansi_string());

    while !game.is_over() {
        let id = game.current_player();
        let name = &names[id.get() as usize - 1];
        let started = Instant::now(); // The timer keeps running across illegal attempts

        loop {
            match ask_move(name, id, config.cols, started, limit)? {
                TurnInput::Quit => {
                    println!("{}", yellow("Exiting..."));
                    return Ok(());
                }
                TurnInput::TimedOut => {
                    game.forfeit_turn();
                    println!(
                        "{}, the move has been transferred to the next player.",
                        yellow("You took too long")
                    );
                    break;
                }
                TurnInput::Move(kind, column) => match game.play_turn(kind, column) {
                    Ok(changes) => {
                        println!("{}", game.grid().to_ansi_string());
                        announce_changes(&changes, &names);
                        break;
                    }
                    Err(e) => println!("{}", yellow(&format!("{}, try again.", e))),
                },
            }
        }
    }

    if let Some(outcome) = game.outcome() {
        announce_outcome(&outcome, &names);
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", GameConfig::default_toml());
        return ExitCode::SUCCESS;
    }

    let level = if args.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
