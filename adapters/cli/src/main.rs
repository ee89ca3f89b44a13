#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that replays, verifies, and submits keystroke logs.

mod config;
mod submission;
mod terminal_input;

use std::{
    fs,
    io::{self, IsTerminal, Read},
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use keyplay_core::{Command as WorldCommand, GameKind, Key};
use keyplay_rendering::{present, RenderingBackend, TerminalBackend, TextGrid};
use keyplay_system_keylog::{
    decode_log, encode_keys, rle_compress, rle_decompress, sign_log, DecodedLog,
};
use keyplay_system_playback::{InstantPacer, Pacer, Playback, ThreadPacer};
use keyplay_world::{self as world, query, World, WorldConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use self::{
    config::Config,
    submission::{submit, DirectoryStore, Student},
    terminal_input::{next_input, Input, KeyboardPacer, RawMode},
};

/// Replay and grade keystroke logs recorded from the snake and creature games.
#[derive(Debug, Parser)]
#[command(name = "keyplay", version, about, long_about = None)]
struct Cli {
    /// Settings file; defaults to `keyplay.toml` in the working directory.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Verify a log and replay it, printing the grid.
    Replay {
        #[command(flatten)]
        session: SessionArgs,
        /// Milliseconds between replayed keys.
        #[arg(long)]
        delay_ms: Option<u64>,
        /// Print a frame after every key.
        #[arg(long)]
        frames: bool,
        /// Wrap glyphs in ANSI truecolor escapes.
        #[arg(long)]
        color: bool,
    },
    /// Play a game live from the keyboard.
    Play {
        /// Game to play.
        #[arg(long, value_enum)]
        game: Option<GameArg>,
        /// Seed for candy placement.
        #[arg(long)]
        seed: Option<u32>,
        /// Wrap glyphs in ANSI truecolor escapes.
        #[arg(long)]
        color: bool,
        /// Write the signed keystroke log here when the session ends.
        #[arg(long)]
        record: Option<PathBuf>,
    },
    /// Verify a log and replay it instantly, printing the final status.
    Verify {
        #[command(flatten)]
        session: SessionArgs,
    },
    /// Append a checksum trailer to a log body.
    Sign {
        /// Body file, or `-` for standard input.
        input: PathBuf,
    },
    /// Run-length encode a log body.
    Compress {
        /// Body file, or `-` for standard input.
        input: PathBuf,
    },
    /// Expand a run-length encoded log body.
    Decompress {
        /// Encoded file, or `-` for standard input.
        input: PathBuf,
    },
    /// Verify and replay a log, then store it with the student's record.
    Submit {
        #[command(flatten)]
        session: SessionArgs,
        /// Student's given name.
        #[arg(long)]
        first_name: String,
        /// Student's family name.
        #[arg(long)]
        last_name: String,
        /// Identifier used to key the stored records.
        #[arg(long)]
        student_id: String,
        /// Directory receiving the submission files.
        #[arg(long)]
        store: PathBuf,
    },
}

#[derive(Debug, Args)]
struct SessionArgs {
    /// Log file with checksum trailer, or `-` for standard input.
    log: PathBuf,
    /// Game the log was recorded against.
    #[arg(long, value_enum)]
    game: Option<GameArg>,
    /// Seed for candy placement.
    #[arg(long)]
    seed: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum GameArg {
    Snake,
    Creatures,
}

impl From<GameArg> for GameKind {
    fn from(value: GameArg) -> Self {
        match value {
            GameArg::Snake => Self::Snake,
            GameArg::Creatures => Self::Creatures,
        }
    }
}

/// Entry point for the Keyplay command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    run(cli.command, &config)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}

fn run(command: CliCommand, config: &Config) -> Result<()> {
    match command {
        CliCommand::Replay {
            session,
            delay_ms,
            frames,
            color,
        } => {
            let mut options = ReplayOptions::from_config(config);
            if let Some(delay_ms) = delay_ms {
                options.delay = Duration::from_millis(delay_ms);
            }
            options.frames |= frames;
            options.color |= color;
            replay(&session, config, options)
        }
        CliCommand::Play {
            game,
            seed,
            color,
            record,
        } => {
            let kind = game.map_or(config.game.kind, GameKind::from);
            let world_config = WorldConfig::new(kind).with_seed(seed.unwrap_or(config.game.seed));
            play(world_config, color || config.render.color, record.as_deref())
        }
        CliCommand::Verify { session } => {
            let (log, config) = load_session(&session, config)?;
            let (world, _) = grade(log.keys().to_vec(), config);
            println!("{}", query::status_line(&world));
            Ok(())
        }
        CliCommand::Sign { input } => {
            println!("{}", sign_log(&read_input(&input)?));
            Ok(())
        }
        CliCommand::Compress { input } => {
            println!("{}", rle_compress(&read_input(&input)?)?);
            Ok(())
        }
        CliCommand::Decompress { input } => {
            println!("{}", rle_decompress(&read_input(&input)?)?);
            Ok(())
        }
        CliCommand::Submit {
            session,
            first_name,
            last_name,
            student_id,
            store,
        } => {
            let (log, config) = load_session(&session, config)?;
            let (world, playback) = grade(log.keys().to_vec(), config);
            ensure_complete(&playback)?;
            info!(status = %query::status_line(&world), "graded submission");

            let mut store = DirectoryStore::open(&store)?;
            let student = Student {
                first_name,
                last_name,
                student_id,
            };
            let record = submit(&mut store, student, log.body())?;
            println!(
                "stored {} and submission-{}",
                record.keystrokes_key, record.student_id
            );
            Ok(())
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct ReplayOptions {
    delay: Duration,
    frames: bool,
    color: bool,
}

impl ReplayOptions {
    fn from_config(config: &Config) -> Self {
        Self {
            delay: config.playback.delay(),
            frames: config.render.frames,
            color: config.render.color,
        }
    }
}

fn replay(session: &SessionArgs, config: &Config, options: ReplayOptions) -> Result<()> {
    let (log, world_config) = load_session(session, config)?;
    let mut world = World::new(world_config);
    let mut canvas = TextGrid::new(query::grid(&world))?;
    let mut backend = TerminalBackend::new(io::stdout().lock(), options.color);
    let mut playback = Playback::new(log.into_keys()).with_delay(options.delay);

    let mut events = Vec::new();
    world::apply(&mut world, WorldCommand::Repaint, &mut events);
    present(&mut canvas, &events);

    if options.frames && io::stdin().is_terminal() {
        let _raw = RawMode::enable()?;
        let mut backend = backend.redrawing();
        let mut pacer = KeyboardPacer::new(playback.pause_handle());
        backend.present(&canvas)?;
        replay_frames(&mut world, &mut playback, &mut canvas, &mut backend, &mut pacer)?;
    } else if options.frames {
        backend.present(&canvas)?;
        replay_frames(&mut world, &mut playback, &mut canvas, &mut backend, &mut ThreadPacer)?;
    } else {
        events.clear();
        let _ = playback.run(&mut world, &mut InstantPacer, &mut events);
        present(&mut canvas, &events);
        backend.present(&canvas)?;
    }

    if !playback.is_complete() {
        warn!(
            replayed = playback.index(),
            total = playback.len(),
            "replay stopped early"
        );
    } else if playback.index() < playback.len() {
        warn!(
            unread = playback.len() - playback.index(),
            "game ended before the log was exhausted"
        );
    }
    Ok(())
}

/// Presents a frame after every replayed key, suspending through `pacer`
/// first. Returns once the playback completes or a step is refused.
fn replay_frames<B: RenderingBackend, P: Pacer>(
    world: &mut World,
    playback: &mut Playback,
    canvas: &mut TextGrid,
    backend: &mut B,
    pacer: &mut P,
) -> Result<()> {
    let mut events = Vec::new();
    while !playback.is_complete() {
        pacer.suspend(playback.delay());
        events.clear();
        if !playback.step(world, &mut events) {
            break;
        }
        present(canvas, &events);
        backend.present(canvas)?;
    }
    Ok(())
}

/// Runs a live session: keys from the terminal go straight to the world
/// until the game ends or Ctrl-C is pressed.
fn play(config: WorldConfig, color: bool, record: Option<&Path>) -> Result<()> {
    if !io::stdin().is_terminal() {
        bail!("play needs an interactive terminal on standard input");
    }
    let mut world = World::new(config);
    let mut canvas = TextGrid::new(query::grid(&world))?;
    let mut events = Vec::new();
    world::apply(&mut world, WorldCommand::Repaint, &mut events);
    present(&mut canvas, &events);

    let mut keys = Vec::new();
    {
        let _raw = RawMode::enable()?;
        let mut backend = TerminalBackend::new(io::stdout().lock(), color).redrawing();
        backend.present(&canvas)?;
        while !query::is_game_over(&world) {
            let key = match next_input()? {
                Input::Key(key) => key,
                Input::Exit => break,
            };
            if !key.is_quit() {
                keys.push(key);
            }
            events.clear();
            world::apply(&mut world, WorldCommand::PressKey { key }, &mut events);
            present(&mut canvas, &events);
            backend.present(&canvas)?;
        }
    }

    println!("{}", query::status_line(&world));
    info!(keys = keys.len(), turns = query::turn_count(&world), "session ended");
    if let Some(path) = record {
        fs::write(path, format!("{}\n", sign_log(&encode_keys(&keys))))
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "recorded keystroke log");
    }
    Ok(())
}

/// Replays `keys` to completion without delay.
fn grade(keys: Vec<Key>, config: WorldConfig) -> (World, Playback) {
    let mut world = World::new(config);
    let mut playback = Playback::new(keys);
    let mut events = Vec::new();
    let _ = playback.run(&mut world, &mut InstantPacer, &mut events);
    info!(
        turns = query::turn_count(&world),
        over = query::is_game_over(&world),
        "replay finished"
    );
    (world, playback)
}

/// Refuses to grade a replay that stopped before the log or the game ended.
fn ensure_complete(playback: &Playback) -> Result<()> {
    if !playback.is_complete() {
        bail!(
            "replay stopped at key {} of {} before completing",
            playback.index(),
            playback.len()
        );
    }
    Ok(())
}

fn load_session(session: &SessionArgs, config: &Config) -> Result<(DecodedLog, WorldConfig)> {
    let text = read_input(&session.log)?;
    let log = decode_log(&text)
        .with_context(|| format!("{} is not a valid keystroke log", session.log.display()))?;

    let kind = session.game.map_or(config.game.kind, GameKind::from);
    let seed = session.seed.unwrap_or(config.game.seed);
    Ok((log, WorldConfig::new(kind).with_seed(seed)))
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        let _ = io::stdin()
            .read_to_string(&mut text)
            .context("failed to read standard input")?;
        return Ok(text);
    }
    if !path.is_file() {
        bail!("{} does not exist", path.display());
    }
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_replay_flags() {
        let cli = Cli::try_parse_from([
            "keyplay",
            "replay",
            "run.txt",
            "--game",
            "creatures",
            "--delay-ms",
            "5",
            "--frames",
        ])
        .expect("arguments parse");

        let CliCommand::Replay {
            session,
            delay_ms,
            frames,
            color,
        } = cli.command
        else {
            panic!("expected replay command");
        };
        assert_eq!(session.log, PathBuf::from("run.txt"));
        assert_eq!(session.game, Some(GameArg::Creatures));
        assert_eq!(delay_ms, Some(5));
        assert!(frames);
        assert!(!color);
    }

    #[test]
    fn submit_requires_student_identity() {
        let error = Cli::try_parse_from(["keyplay", "submit", "run.txt", "--store", "out"])
            .expect_err("identity flags are required");
        assert_eq!(error.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn flags_override_configured_session() {
        let config = Config::parse("[game]\nkind = \"creatures\"\nseed = 9\n").expect("config");
        let session = SessionArgs {
            log: PathBuf::from("-"),
            game: Some(GameArg::Snake),
            seed: None,
        };
        let kind = session.game.map_or(config.game.kind, GameKind::from);
        assert_eq!(kind, GameKind::Snake);
        assert_eq!(session.seed.unwrap_or(config.game.seed), 9);
    }

    #[test]
    fn grading_stops_at_terminal_state() {
        let keys = vec![Key::Char('q'), Key::Code(0)];
        let (world, playback) = grade(keys, WorldConfig::new(GameKind::Snake));
        assert!(query::is_game_over(&world));
        assert_eq!(query::turn_count(&world), 0);
        assert!(ensure_complete(&playback).is_ok());
    }

    #[test]
    fn unfinished_replay_cannot_be_submitted() {
        let mut world = World::new(WorldConfig::new(GameKind::Snake));
        let mut playback = Playback::new(vec![Key::Code(0); 3]);
        assert!(playback.step(&mut world, &mut Vec::new()));

        let error = ensure_complete(&playback).expect_err("playback is mid-log");
        assert_eq!(
            error.to_string(),
            "replay stopped at key 1 of 3 before completing"
        );

        let _ = playback.run(&mut world, &mut InstantPacer, &mut Vec::new());
        assert!(ensure_complete(&playback).is_ok());
    }

    #[test]
    fn framed_replay_presents_one_frame_per_key() {
        let mut world = World::new(WorldConfig::new(GameKind::Snake));
        let mut canvas = TextGrid::new(query::grid(&world)).expect("grid");
        let mut backend = TerminalBackend::new(Vec::new(), false);
        let mut playback = Playback::new(vec![Key::Code(0); 3]);

        replay_frames(
            &mut world,
            &mut playback,
            &mut canvas,
            &mut backend,
            &mut InstantPacer,
        )
        .expect("frames render");

        assert!(playback.is_complete());
        assert_eq!(backend.frames(), 3);
    }

    #[test]
    fn stopped_replay_leaves_the_rest_of_the_log() {
        let mut world = World::new(WorldConfig::new(GameKind::Snake));
        let mut canvas = TextGrid::new(query::grid(&world)).expect("grid");
        let mut backend = TerminalBackend::new(Vec::new(), false);
        let mut playback = Playback::new(vec![Key::Code(0); 3]);
        playback.pause_handle().pause();

        replay_frames(
            &mut world,
            &mut playback,
            &mut canvas,
            &mut backend,
            &mut InstantPacer,
        )
        .expect("frames render");

        assert_eq!(backend.frames(), 0);
        assert!(ensure_complete(&playback).is_err());
    }

    #[test]
    fn parses_play_flags() {
        let cli = Cli::try_parse_from([
            "keyplay", "play", "--game", "snake", "--seed", "4", "--record", "run.txt",
        ])
        .expect("arguments parse");
        let CliCommand::Play {
            game, seed, record, ..
        } = cli.command
        else {
            panic!("expected play command");
        };
        assert_eq!(game, Some(GameArg::Snake));
        assert_eq!(seed, Some(4));
        assert_eq!(record, Some(PathBuf::from("run.txt")));
    }
}
