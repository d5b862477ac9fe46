use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use game_server::app::Game;
use game_server::config::Config;
use game_server::store::ScoreStore;
use log::{info, warn};
use twenty48_core::engine::Direction;

#[derive(Debug, Parser)]
#[command(author, version, about = "Play 2048 in the terminal")]
struct Cli {
    /// Optional TOML configuration file (only [storage] and [game] are used)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory for scores.db, shared with the HTTP server
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Fixed RNG seed for a reproducible game
    #[arg(long, value_name = "N")]
    seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Move(Direction),
    NewGame,
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    match line.trim() {
        "" => None,
        "n" | "new" => Some(Command::NewGame),
        "q" | "quit" | "exit" => Some(Command::Quit),
        other => other.parse().ok().map(Command::Move),
    }
}

fn render<W: Write>(out: &mut W, game: &Game) -> io::Result<()> {
    let view = game.view();
    writeln!(out)?;
    write!(out, "{}", view.grid)?;
    writeln!(out, "score: {}   best: {}", view.score, view.best)?;
    Ok(())
}

fn game_over_text(won: bool) -> &'static str {
    if won { "You win!" } else { "Game over!" }
}

fn run<R: BufRead, W: Write>(game: &mut Game, input: R, out: &mut W) -> Result<()> {
    render(out, game)?;
    writeln!(out, "move with w/a/s/d (or h/j/k/l), n = new game, q = quit")?;
    for line in input.lines() {
        let line = line.context("failed to read input")?;
        let Some(cmd) = parse_command(&line) else {
            warn!("ignoring input {line:?}");
            continue;
        };
        match cmd {
            Command::Quit => break,
            Command::NewGame => {
                game.new_game()?;
                render(out, game)?;
            }
            Command::Move(_) if game.session().is_over() => {
                let text = game_over_text(game.session().is_won());
                writeln!(out, "{text} press n for a new game")?;
            }
            Command::Move(direction) => {
                let outcome = game.apply_move(direction)?;
                if !outcome.moved {
                    continue;
                }
                render(out, game)?;
                if outcome.over {
                    writeln!(out, "{}", game_over_text(outcome.won))?;
                } else if outcome.newly_won {
                    writeln!(out, "You win! keep going")?;
                }
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let mut cfg = Config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        cfg.storage.data_dir = dir;
    }
    if cli.seed.is_some() {
        cfg.game.seed = cli.seed;
    }

    let store = ScoreStore::open(&cfg.storage.data_dir, cfg.storage.history_limit)?;
    let mut game = Game::new(store, cfg.game.seed).context("failed to read score store")?;
    info!("scores in {}", cfg.storage.data_dir.display());

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    run(&mut game, stdin.lock(), &mut stdout)?;
    let view = game.view();
    info!("final score {} (best {})", view.score, view.best);
    Ok(())
}
