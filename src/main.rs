use std::io;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use tracing_subscriber::EnvFilter;

use keyroll::error::Error;
use keyroll::midi::Score;
use keyroll::playback::Player;
use keyroll::roll::{self, Palette, Renderer, RollConfig, ScrollOutcome, frame_interval};

const DEFAULT_BPM: u32 = 120;

/// Display a piano roll from a MIDI file and optionally play music.
#[derive(Parser)]
#[command(name = "keyroll")]
struct Cli {
    /// Path to the MIDI file to be processed
    file: PathBuf,

    /// Animate the piano roll as it scrolls through the notes
    #[arg(short, long)]
    play: bool,

    /// Display a keyboard layout below the piano roll
    #[arg(short, long)]
    keyboard: bool,

    /// Show the piano roll with color coding for notes
    #[arg(short, long)]
    color: bool,

    /// Add borders around the piano roll display
    #[arg(short, long)]
    border: bool,

    /// Play the MIDI file alongside the piano roll animation
    #[arg(short, long)]
    music: bool,

    /// Time steps per beat of the rendering grid
    #[arg(short, long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
    resolution: u32,

    /// RON file overriding the color palette
    #[arg(long)]
    theme: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    if let Err(err) = run(Cli::parse()) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Error> {
    let palette = match &cli.theme {
        Some(path) => Palette::load(path)?,
        None => Palette::default(),
    };
    let config = RollConfig {
        border: cli.border,
        color: cli.color,
        keyboard: cli.keyboard,
        play: cli.play,
        resolution: cli.resolution,
    };

    let score = Score::load(&cli.file)?;
    let grid = roll::build(&score.markers, score.ticks_per_beat, &config);
    let renderer = Renderer::new(config, palette);
    let interval = frame_interval(score.bpm.unwrap_or(DEFAULT_BPM));
    let mut out = io::stdout();

    if cli.music {
        let player = Player::start(&score)?;
        if cli.play {
            let _guard = RawModeGuard::enable()?;
            let outcome =
                renderer.scroll(&grid, &mut out, terminal_height(), interval, poll_wait)?;
            if outcome == ScrollOutcome::Interrupted {
                player.fade_out();
                return Ok(());
            }
            player.finish(poll_wait);
        } else {
            renderer.print(&grid, &mut out)?;
            let _guard = RawModeGuard::enable()?;
            player.finish(poll_wait);
        }
    } else if cli.play {
        renderer.scroll(&grid, &mut out, terminal_height(), interval, |d| {
            thread::sleep(d);
            true
        })?;
    } else {
        renderer.print(&grid, &mut out)?;
    }

    Ok(())
}

fn terminal_height() -> usize {
    terminal::size().map_or(24, |(_, rows)| rows as usize)
}

/// Sleeps one frame interval while watching for an interrupt (Ctrl+C or
/// `q`, delivered as key events while raw mode is active). Returns `false`
/// when the user asked to stop.
fn poll_wait(interval: Duration) -> bool {
    let deadline = Instant::now() + interval;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match event::poll(remaining) {
            Ok(true) => {
                if let Ok(Event::Key(key)) = event::read() {
                    let interrupt = key.kind == KeyEventKind::Press
                        && (key.code == KeyCode::Char('q')
                            || (key.code == KeyCode::Char('c')
                                && key.modifiers.contains(KeyModifiers::CONTROL)));
                    if interrupt {
                        return false;
                    }
                }
            }
            Ok(false) | Err(_) => return true,
        }
        if deadline <= Instant::now() {
            return true;
        }
    }
}

struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> Result<Self, Error> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}
