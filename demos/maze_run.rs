//! Terminal maze solver: generates a maze and animates the A* search over it.
//!
//! Usage: `maze-run [size] [seed]`. The size must be odd and at least 3.

use std::error::Error;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;

use dedale_demos::terminal::Terminal;
use dedale_demos::{Command, View, adjust_delay};
use dedale_maze::{DEFAULT_SIZE, MazeGen};
use dedale_paths::{PathEngine, SearchConfig, SearchEvent};

const STEP_DELAY: Duration = Duration::from_millis(50);
const IDLE_POLL: Duration = Duration::from_millis(100);
const RUN_POLL: Duration = Duration::from_millis(16);

type AppResult<T> = Result<T, Box<dyn Error>>;

fn parse_args() -> AppResult<(i32, Option<u64>)> {
    let mut args = std::env::args().skip(1);
    let size = match args.next() {
        Some(s) => s.parse::<i32>().map_err(|e| format!("invalid size {s:?}: {e}"))?,
        None => DEFAULT_SIZE,
    };
    let seed = match args.next() {
        Some(s) => Some(s.parse::<u64>().map_err(|e| format!("invalid seed {s:?}: {e}"))?),
        None => None,
    };
    Ok((size, seed))
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> AppResult<()> {
    let (size, seed) = parse_args()?;
    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let mut mazes = MazeGen::square(size, rng)?;
    let engine = PathEngine::with_config(SearchConfig {
        step_delay: Some(STEP_DELAY),
    });
    let mut view = View::new(mazes.generate());

    let mut term = Terminal::new();
    term.init()?;
    let result = event_loop(&mut term, &engine, &mut mazes, &mut view);
    term.close();
    result
}

fn event_loop(
    term: &mut Terminal,
    engine: &PathEngine,
    mazes: &mut MazeGen<StdRng>,
    view: &mut View,
) -> AppResult<()> {
    let mut pending: Option<Command> = None;
    loop {
        term.draw(view, engine.config().step_delay)?;
        let cmd = match pending.take() {
            Some(cmd) => Some(cmd),
            None => term.poll_command(IDLE_POLL)?,
        };
        match cmd {
            Some(Command::Quit) => return Ok(()),
            Some(Command::Solve) => pending = solve(term, engine, view)?,
            Some(Command::Reset) => view.reset(),
            Some(Command::Regenerate) => *view = View::new(mazes.generate()),
            Some(cmd @ (Command::Faster | Command::Slower)) => {
                engine.set_step_delay(adjust_delay(engine.config().step_delay, cmd));
            }
            Some(Command::Pause | Command::Resume) | None => {}
        }
    }
}

/// Run one search on a worker thread while the UI keeps handling keys.
///
/// Returns a command that ended the run early and still has to be handled
/// by the caller (quit or regenerate).
fn solve(term: &mut Terminal, engine: &PathEngine, view: &mut View) -> AppResult<Option<Command>> {
    let maze = view.maze.clone();
    let search = engine.find_path(&maze, maze.start, maze.end)?;
    view.begin();
    let (tx, rx) = mpsc::channel();

    thread::scope(|s| {
        s.spawn(move || {
            for event in search {
                if tx.send(event).is_err() {
                    break;
                }
            }
        });
        let result = watch(term, engine, view, &rx);
        if result.is_err() {
            // unblock the worker so the scope can join it
            engine.cancel();
        }
        result
    })
}

fn watch(
    term: &mut Terminal,
    engine: &PathEngine,
    view: &mut View,
    events: &mpsc::Receiver<SearchEvent>,
) -> AppResult<Option<Command>> {
    let mut deferred: Option<Command> = None;
    loop {
        for event in events.try_iter() {
            view.apply(event);
        }
        term.draw(view, engine.config().step_delay)?;
        if !view.is_active() {
            if deferred == Some(Command::Reset) {
                view.reset();
                deferred = None;
            }
            return Ok(deferred);
        }

        match term.poll_command(RUN_POLL)? {
            Some(Command::Pause) => {
                engine.pause();
                view.set_paused(true);
            }
            Some(Command::Resume) => {
                engine.resume();
                view.set_paused(false);
            }
            Some(cmd @ (Command::Reset | Command::Regenerate | Command::Quit)) => {
                log::debug!("search interrupted by {cmd:?}");
                engine.cancel();
                deferred = Some(cmd);
            }
            Some(cmd @ (Command::Faster | Command::Slower)) => {
                engine.set_step_delay(adjust_delay(engine.config().step_delay, cmd));
            }
            Some(Command::Solve) | None => {}
        }
    }
}
