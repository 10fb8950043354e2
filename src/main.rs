use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use crossterm::terminal;

use cvseq::audio::{self, AudioHandle, SilentOutput};
use cvseq::hal::{CvOutput, DisplaySink, PeriodicTimer};
use cvseq::middle::Middle;
use cvseq::pipeline::persistence;
use cvseq::shared::InputEvent;
use cvseq::timer::ThreadTimer;
use cvseq::tui::panel::FrontPanel;
use cvseq::tui::{self, TerminalPanel};

#[derive(Parser)]
#[command(name = "cvseq")]
#[command(about = "Nine step CV/gate sequencer, played from the keyboard", long_about = None)]
struct Args {
    /// Config file (default: .cvseq/config.json in the current directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run without a sound device; CV and gate only show on screen
    #[arg(long)]
    silent: bool,

    /// More detail in the log file (-v debug, -vv every control cycle)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Write the effective config out and exit
    #[arg(long)]
    write_config: bool,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(log_path: &Path, verbose: u8) {
    use simplelog::{Config as LogConfig, LevelFilter, WriteLogger};

    let log_level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    // no log file just means no diagnostics
    match File::create(log_path) {
        Ok(file) => {
            let _ = WriteLogger::init(log_level, LogConfig::default(), file);
            log::info!("cvseq starting (log level: {:?})", log_level);
        }
        Err(e) => eprintln!("cvseq: logging disabled ({}: {})", log_path.display(), e),
    }
}

fn run() -> anyhow::Result<()> {
    let args = Args::parse();
    let project_dir = std::env::current_dir().context("no working directory")?;
    init_logging(&persistence::log_file_path(&project_dir), args.verbose);

    let config_path = args
        .config
        .unwrap_or_else(|| persistence::config_file_path(&project_dir));
    let config = persistence::load_config(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    if args.write_config {
        persistence::save_config(&config_path, &config)?;
        println!("wrote {}", config_path.display());
        return Ok(());
    }

    // every collaborator exists before the clock starts
    let (audio, output): (Option<AudioHandle>, Arc<dyn CvOutput>) = if args.silent {
        log::info!("running silent");
        (None, Arc::new(SilentOutput::default()))
    } else {
        let audio = audio::start_audio(config.dac_scaler()?.reversed()?)?;
        let output = Arc::new(audio.output());
        (Some(audio), output)
    };
    let mut middle = Middle::new(&config, output)?;
    let mut panel = FrontPanel::new(
        config.analog_range.high() as u16,
        middle.tempo_reading().round() as u16,
    );
    let mut timer = ThreadTimer::new();

    terminal::enable_raw_mode()?;
    // real press/release reporting where the terminal supports it
    let _ = crossterm::execute!(
        std::io::stdout(),
        crossterm::event::PushKeyboardEnhancementFlags(
            crossterm::event::KeyboardEnhancementFlags::REPORT_EVENT_TYPES
        )
    );
    let _guard = RawModeGuard;
    let mut screen = TerminalPanel::new()?;

    middle.start(&mut timer)?;
    let started = Instant::now();
    let control_period = Duration::from_millis(config.control_period_ms);

    'control: loop {
        let events = tui::input::poll_input(control_period)?;
        let seen = Instant::now();
        for event in &events {
            if *event == InputEvent::Quit {
                break 'control;
            }
            panel.apply(event, seen);
        }
        panel.expire(seen);

        let now = started.elapsed().as_millis() as u64;
        let ds = middle.control_cycle(now, &mut panel, &mut timer)?;
        screen.set_controls(panel.controls());
        screen.show(ds)?;
    }

    timer.detach();
    drop(screen);
    drop(audio);
    log::info!("cvseq stopped");
    Ok(())
}

struct RawModeGuard;
impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = crossterm::execute!(
            std::io::stdout(),
            crossterm::event::PopKeyboardEnhancementFlags
        );
        let _ = terminal::disable_raw_mode();
    }
}
