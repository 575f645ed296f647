use chrono::{Local, TimeZone};
use clap::{Parser, Subcommand};
use lockin_core::*;
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "lockin")]
#[command(about = "Focus timer for alternating work and rest sessions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Read configuration from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current session (default)
    Status,

    /// Start or resume the countdown and run it in the foreground (Ctrl-C pauses)
    Start {
        /// Milliseconds between ticks
        #[arg(long, default_value_t = 1000, hide = true)]
        tick_ms: u64,
    },

    /// Pause the session, recording the time elapsed since it was started
    Pause,

    /// End the session, record elapsed time, and reset the countdown
    Stop,

    /// Reset the countdown without recording anything
    Reset,

    /// Switch between work and rest
    Mode,

    /// Show or change session durations
    Settings {
        /// Work duration in minutes
        #[arg(long)]
        work: Option<u32>,

        /// Rest duration in minutes
        #[arg(long)]
        rest: Option<u32>,
    },

    /// Show the daily work heatmap and total deep work time
    Progress {
        /// Number of days to show
        #[arg(long)]
        days: Option<u32>,
    },

    /// Export recorded sessions as CSV
    Export {
        /// Output file
        #[arg(long)]
        out: PathBuf,
    },
}

impl Commands {
    fn mutates_state(&self) -> bool {
        match self {
            Commands::Start { .. }
            | Commands::Pause
            | Commands::Stop
            | Commands::Reset
            | Commands::Mode => true,
            Commands::Settings { work, rest } => work.is_some() || rest.is_some(),
            Commands::Status | Commands::Progress { .. } | Commands::Export { .. } => false,
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging
    lockin_core::logging::init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    std::fs::create_dir_all(&data_dir)?;
    let state_path = data_dir.join("state.json");

    let command = cli.command.unwrap_or(Commands::Status);

    // Writers hold the lock from load to save; `start` holds it for the whole run
    let _lock = if command.mutates_state() {
        match StateLock::acquire(&state_path) {
            Ok(lock) => Some(lock),
            Err(e) => {
                eprintln!("{}", e);
                return Err(e);
            }
        }
    } else {
        None
    };

    let store = StoreSnapshot::load_or(&state_path, config.timer.settings())?;
    let mut engine = SessionEngine::new(store);

    match command {
        Commands::Status => cmd_status(&engine),
        Commands::Start { tick_ms } => cmd_start(&mut engine, &state_path, &config, tick_ms),
        Commands::Pause => {
            let record = engine.pause();
            engine.snapshot().save(&state_path)?;
            report_record(record);
            println!(
                "Paused with {} remaining",
                format_clock(engine.current_session().time_remaining)
            );
            Ok(())
        }
        Commands::Stop => {
            let record = engine.stop();
            engine.snapshot().save(&state_path)?;
            report_record(record);
            println!(
                "Stopped. {} session reset to {}",
                engine.current_session().mode,
                format_clock(engine.current_session().time_remaining)
            );
            Ok(())
        }
        Commands::Reset => {
            if engine.is_active() {
                eprintln!("Warning: session was running; elapsed time was not recorded");
            }
            engine.reset();
            engine.snapshot().save(&state_path)?;
            println!(
                "Reset {} session to {}",
                engine.current_session().mode,
                format_clock(engine.current_session().time_remaining)
            );
            Ok(())
        }
        Commands::Mode => {
            if engine.is_active() {
                eprintln!("Warning: session was running; elapsed time was not recorded");
            }
            engine.toggle_mode();
            engine.snapshot().save(&state_path)?;
            println!(
                "Switched to {} ({})",
                engine.current_session().mode,
                format_clock(engine.current_session().time_remaining)
            );
            Ok(())
        }
        Commands::Settings { work, rest } => cmd_settings(&mut engine, &state_path, work, rest),
        Commands::Progress { days } => {
            let days = validate_window(days.unwrap_or(config.progress.heatmap_days))?;
            cmd_progress(&engine, days)
        }
        Commands::Export { out } => {
            let count = export_csv(engine.ledger(), &out)?;
            println!("✓ Exported {} sessions to {}", count, out.display());
            Ok(())
        }
    }
}

fn cmd_status(engine: &SessionEngine) -> Result<()> {
    let session = engine.current_session();
    let today = engine.clock().today();

    println!("Mode:      {}", session.mode);
    println!("Remaining: {}", format_clock(session.time_remaining));
    println!(
        "Status:    {}",
        if session.is_active { "running" } else { "idle" }
    );
    println!(
        "Progress:  {:.0}%",
        session.progress_pct(engine.settings())
    );
    println!(
        "Today:     {} hours of deep work",
        format_hours(engine.ledger().work_minutes_on(today))
    );
    Ok(())
}

fn cmd_start(
    engine: &mut SessionEngine,
    state_path: &Path,
    config: &Config,
    tick_ms: u64,
) -> Result<()> {
    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = Arc::clone(&cancel);
        ctrlc::set_handler(move || cancel.store(true, Ordering::SeqCst))
            .map_err(|e| Error::Other(format!("Failed to install Ctrl-C handler: {}", e)))?;
    }

    engine.start();
    engine.snapshot().save(state_path)?;
    println!(
        "Started {} session ({} remaining)",
        engine.current_session().mode,
        format_clock(engine.current_session().time_remaining)
    );

    let mut notifier: Box<dyn Notifier> = if config.notifications.enabled {
        Box::new(TerminalNotifier::stdout(config.notifications.bell))
    } else {
        Box::new(SilentNotifier)
    };
    let live = std::io::stdout().is_terminal();
    let mut ticker = IntervalTicker::new(Duration::from_millis(tick_ms));

    let outcome = run_session(engine, &mut ticker, &cancel, |event, snapshot| {
        snapshot.save(state_path)?;
        match event {
            DriveEvent::Tick if live => {
                print!("\r  {} ", format_clock(snapshot.current_session.time_remaining));
                std::io::stdout().flush()?;
            }
            DriveEvent::Completed(done) => {
                if live {
                    println!();
                }
                if let Err(e) = notifier.notify(&done) {
                    tracing::warn!("Completion notification failed: {}", e);
                }
            }
            DriveEvent::Interrupted(_) if live => println!(),
            _ => {}
        }
        Ok(())
    })?;

    match outcome {
        DriveOutcome::Completed(done) => report_record(Some(done.record)),
        DriveOutcome::Interrupted(record) => {
            report_record(record);
            println!(
                "Paused with {} remaining",
                format_clock(engine.current_session().time_remaining)
            );
        }
        DriveOutcome::Idle => {
            engine.snapshot().save(state_path)?;
            println!("Nothing to run. Use `lockin reset` or `lockin mode` to begin a new session.");
        }
    }
    Ok(())
}

fn cmd_settings(
    engine: &mut SessionEngine,
    state_path: &Path,
    work: Option<u32>,
    rest: Option<u32>,
) -> Result<()> {
    let update = SettingsUpdate::from_minutes(work, rest);
    if !update.is_empty() {
        update.validate()?;
        engine.update_settings(update);
        engine.snapshot().save(state_path)?;
        println!("✓ Settings saved");
    }

    let settings = engine.settings();
    println!("Work: {} min", settings.work_duration / 60);
    println!("Rest: {} min", settings.rest_duration / 60);
    Ok(())
}

fn cmd_progress(engine: &SessionEngine, days: u32) -> Result<()> {
    let ledger = engine.ledger();
    let cells = heatmap(ledger, engine.clock().today(), days);

    println!("\nLast {} days (oldest first)\n", days);
    for week in cells.chunks(7) {
        let row: String = week
            .iter()
            .map(|c| c.intensity.glyph().to_string())
            .collect::<Vec<_>>()
            .join(" ");
        println!("  {}", row);
    }
    println!("\n  Less {} More", legend());

    let active: Vec<_> = cells.iter().filter(|c| c.minutes > 0.0).collect();
    if !active.is_empty() {
        println!();
        for cell in active {
            println!(
                "  {}  {} hours",
                cell.date.format("%b %e, %Y"),
                format_hours(cell.minutes)
            );
            for session in &cell.sessions {
                let at = Local
                    .timestamp_millis_opt(session.timestamp)
                    .single()
                    .map(|t| t.format("%l:%M %p").to_string())
                    .unwrap_or_else(|| "--:--".into());
                println!(
                    "      {}: {:.1}h",
                    at.trim(),
                    f64::from(session.duration) / 3600.0
                );
            }
        }
    }

    println!();
    println!("  {} hours", format_hours(ledger.total_work_minutes()));
    println!("  Total deep work time");
    Ok(())
}

fn legend() -> String {
    [
        Intensity::None,
        Intensity::Low,
        Intensity::Medium,
        Intensity::High,
        Intensity::Max,
    ]
    .iter()
    .map(|i| i.glyph().to_string())
    .collect::<Vec<_>>()
    .join(" ")
}

fn report_record(record: Option<SessionRecord>) {
    match record {
        Some(record) => println!(
            "✓ Recorded {:.1} min of {}",
            record.minutes(),
            record.session_type.as_str()
        ),
        None => println!("No elapsed time to record"),
    }
}
