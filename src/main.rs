//! # Arcade Hub Main Entry Point
//!
//! Command line front end: prints generated content, runs games headless
//! under the autopilot, and replays key scripts through the scene manager.

use arcade_hub::generation::utils::create_rng;
use arcade_hub::{
    ActiveGame, ArcadeError, ArcadeResult, AsciiDisplay, Autopilot, DungeonGenerator, GameKind,
    GenerationConfig, Generator, HighScoreTable, Key, LevelManager, LldmClient, MazeGenerator,
    Minigame, SceneManager, Session,
};
use clap::{Parser, Subcommand};
use log::{info, LevelFilter};
use serde_json::json;
use std::path::{Path, PathBuf};

/// Command line arguments for the arcade hub.
#[derive(Parser, Debug)]
#[command(name = "arcade-hub")]
#[command(about = "A collection of small 2D arcade games with generated levels")]
#[command(version)]
struct Args {
    /// Random seed for generation and gameplay
    #[arg(short, long, global = true, default_value_t = 12345)]
    seed: u64,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// High score file read before and written after a run
    #[arg(long, global = true)]
    scores: Option<PathBuf>,

    /// Feed the monkey runner from generated waves instead of spawn timers
    #[arg(long, global = true)]
    patterns: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate and print a maze with its shortest path
    Maze {
        #[arg(short, long, default_value_t = 1)]
        level: u32,
        #[arg(long, default_value_t = arcade_hub::config::DEFAULT_MAZE_SIZE)]
        size: usize,
    },
    /// Generate and print a dungeon map
    Dungeon {
        #[arg(short, long, default_value_t = 1)]
        level: u32,
    },
    /// Print the puzzle for a level, optionally revealing hints or checking an answer
    Puzzle {
        #[arg(short, long, default_value_t = 1)]
        level: u32,
        #[arg(long, default_value_t = 0)]
        hints: usize,
        #[arg(short, long)]
        answer: Option<String>,
    },
    /// Run a game under the autopilot and print the result as JSON
    Simulate {
        /// crawler, maze, runner, racing or shooter
        game: String,
        #[arg(short, long, default_value_t = 3600)]
        frames: u64,
    },
    /// Replay a comma separated key script through the menus and games
    Play {
        #[arg(short, long, default_value = "")]
        keys: String,
        /// Frames to run after each key
        #[arg(long, default_value_t = 1)]
        frames_per_key: u32,
    },
}

fn main() -> ArcadeResult<()> {
    let args = Args::parse();

    initialize_logging(&args.log_level)?;

    info!("Starting Arcade Hub v{}", arcade_hub::VERSION);

    let config = GenerationConfig {
        runner_patterns: args.patterns,
        ..GenerationConfig::for_testing(args.seed)
    };
    match &args.command {
        Command::Maze { level, size } => print_maze(&config, *level, *size),
        Command::Dungeon { level } => print_dungeon(&config, *level),
        Command::Puzzle {
            level,
            hints,
            answer,
        } => print_puzzle(&config, *level, *hints, answer.as_deref()),
        Command::Simulate { game, frames } => {
            simulate(&config, args.scores.as_deref(), game, *frames)
        }
        Command::Play {
            keys,
            frames_per_key,
        } => play(&config, args.scores.as_deref(), keys, *frames_per_key),
    }
}

/// Initializes the logging system based on the specified log level.
fn initialize_logging(log_level: &str) -> ArcadeResult<()> {
    let level = match log_level.to_lowercase().as_str() {
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        other => {
            return Err(ArcadeError::InvalidAction(format!(
                "Unknown log level: {}",
                other
            )))
        }
    };

    env_logger::Builder::new()
        .filter_level(level)
        .format_target(false)
        .try_init()
        .map_err(|e| ArcadeError::InvalidState(e.to_string()))
}

fn print_maze(config: &GenerationConfig, level: u32, size: usize) -> ArcadeResult<()> {
    let config = GenerationConfig {
        maze_size: size,
        ..config.for_level(level)
    };
    let mut rng = create_rng(&config);
    let layout = MazeGenerator::new().generate_with_source(
        &mut LldmClient::offline(),
        &config,
        &mut rng,
    )?;
    let path = layout.solution_path();

    println!("{}", AsciiDisplay::new().render_maze_layout(&layout, path.as_deref()));
    match path {
        Some(cells) => println!("Path length: {}", cells.len()),
        None => println!("No path"),
    }
    Ok(())
}

fn print_dungeon(config: &GenerationConfig, level: u32) -> ArcadeResult<()> {
    let config = config.for_level(level);
    let mut rng = create_rng(&config);
    let map = DungeonGenerator::new().generate(&config, &mut rng)?;

    println!("{}", AsciiDisplay::new().render_dungeon(&map));
    println!(
        "Level {}: {} floor tiles, {} hazard tiles",
        map.level,
        map.floor_cells().len(),
        map.hazard_cells().len()
    );
    Ok(())
}

fn print_puzzle(
    config: &GenerationConfig,
    level: u32,
    hints: usize,
    answer: Option<&str>,
) -> ArcadeResult<()> {
    let mut levels = LevelManager::at_level(config.clone(), LldmClient::offline(), level);
    let puzzle = levels.current_puzzle()?.clone();

    let mut revealed = Vec::new();
    for _ in 0..hints {
        match levels.next_hint()? {
            Some(hint) => revealed.push(hint),
            None => break,
        }
    }
    let correct = answer.map(|answer| levels.submit_answer(answer)).transpose()?;

    let report = json!({
        "level": levels.current_level,
        "theme": levels.profile.theme,
        "enemies": levels.profile.enemy_spawns().len(),
        "description": puzzle.description,
        "visualization": puzzle.visualization,
        "hints": revealed,
        "correct": correct,
        "phase": levels.phase,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn load_scores(path: Option<&Path>) -> ArcadeResult<HighScoreTable> {
    match path {
        Some(path) => HighScoreTable::load_from_file(path),
        None => Ok(HighScoreTable::new()),
    }
}

fn save_scores(path: Option<&Path>, scores: &HighScoreTable) -> ArcadeResult<()> {
    if let Some(path) = path {
        scores.save_to_file(path)?;
        info!("Saved high scores to {}", path.display());
    }
    Ok(())
}

fn simulate(
    config: &GenerationConfig,
    scores: Option<&Path>,
    game: &str,
    frames: u64,
) -> ArcadeResult<()> {
    let kind = GameKind::from_name(game)?;
    let mut session = Session::with_scores(config.clone(), load_scores(scores)?);
    session.start_game(kind)?;
    let mut autopilot = Autopilot::new();

    let mut played = 0;
    while played < frames {
        let Some(game) = session.active.as_ref() else {
            break;
        };
        if game.is_over() {
            break;
        }
        if let Some(input) = autopilot.next_input(game) {
            session.apply_input(&input)?;
        }
        session.tick()?;
        played += 1;
    }

    let (status, finished) = match &session.active {
        Some(game) => (game.status_line(), game.is_over()),
        None => (String::new(), false),
    };
    let level = match &session.active {
        Some(ActiveGame::Crawler(crawler)) => Some(crawler.level),
        Some(ActiveGame::Maze(maze)) => Some(maze.level),
        _ => None,
    };
    let (_, score) = session
        .finish_game()
        .ok_or_else(|| ArcadeError::InvalidState("No game was running".to_string()))?;

    let report = json!({
        "game": kind,
        "seed": config.seed,
        "frames": played,
        "score": score,
        "finished": finished,
        "level": level,
        "status": status,
        "best": session.scores.best_score(kind),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    save_scores(scores, &session.scores)
}

fn play(
    config: &GenerationConfig,
    scores: Option<&Path>,
    keys: &str,
    frames_per_key: u32,
) -> ArcadeResult<()> {
    let session = Session::with_scores(config.clone(), load_scores(scores)?);
    let mut scenes = SceneManager::with_session(session);

    for name in keys.split(',').filter(|name| !name.trim().is_empty()) {
        let key = Key::parse(name)?;
        scenes.handle_key(key)?;
        if scenes.should_quit() {
            break;
        }
        for _ in 0..frames_per_key {
            scenes.update()?;
        }
    }

    println!("{}", scenes.render());
    save_scores(scores, &scenes.session().scores)
}
