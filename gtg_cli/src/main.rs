use chrono::{DateTime, Duration, Utc};
use clap::{Parser, Subcommand};
use gtg_core::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gtg")]
#[command(about = "Grease-the-groove workout reminders", long_about = None)]
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
    /// Configure the exercise and compute the starting rep target
    Setup {
        /// Exercise name (e.g. "Pushups")
        #[arg(long)]
        exercise: String,

        /// Most reps you can do in one fresh set
        #[arg(long)]
        max_reps: i32,

        /// Rest between sets, in minutes
        #[arg(long)]
        rest: i32,
    },

    /// Show the current target and rest countdown (default)
    Status,

    /// Record a finished set with its difficulty rating
    Done {
        /// Rating of perceived exertion, 1 (easy) to 10 (maximal)
        #[arg(long, allow_negative_numbers = true)]
        rpe: i32,
    },

    /// Fire reminders whose rest period has ended
    Notify {
        /// Evaluate due reminders at this instant (RFC 3339) instead of now
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },

    /// Show recently completed sets
    History {
        /// Number of sets to show
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Forget the workout and cancel any pending reminder
    Reset,
}

type Session = WorkoutSession<FileStateStore, FileJobQueue>;

/// Prints notifications to the terminal
struct ConsoleSink;

impl NotificationSink for ConsoleSink {
    fn notify(&mut self, title: &str, body: &str) {
        println!("🔔 {}", title);
        println!("   {}", body);
    }
}

fn main() -> Result<()> {
    gtg_core::logging::init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(dir) = cli.data_dir {
        config.data.data_dir = dir;
    }

    match cli.command {
        Some(Commands::Setup {
            exercise,
            max_reps,
            rest,
        }) => cmd_setup(&config, &exercise, max_reps, rest),
        Some(Commands::Status) | None => cmd_status(&config),
        Some(Commands::Done { rpe }) => cmd_done(&config, rpe),
        Some(Commands::Notify { at }) => cmd_notify(&config, at.unwrap_or_else(Utc::now)),
        Some(Commands::History { limit }) => cmd_history(&config, limit),
        Some(Commands::Reset) => cmd_reset(&config),
    }
}

fn open_session(config: &Config) -> Result<Session> {
    WorkoutSession::open(
        FileStateStore::new(config.data.state_path()),
        FileJobQueue::new(config.data.jobs_path()),
    )
}

fn cmd_setup(config: &Config, exercise: &str, max_reps: i32, rest: i32) -> Result<()> {
    let bounds = &config.workout;
    if rest < bounds.min_rest_minutes || rest > bounds.max_rest_minutes {
        return Err(Error::InvalidInput(format!(
            "rest must be between {} and {} minutes, got {}",
            bounds.min_rest_minutes, bounds.max_rest_minutes, rest
        )));
    }

    let mut session = open_session(config)?;
    let state = session.setup(exercise, max_reps, rest, Utc::now())?;

    println!("✓ Workout saved!");
    println!("  Exercise: {}", state.exercise_name);
    println!("  Rest: {} minutes", state.rest_duration_minutes);
    println!("  Starting target: {} reps", state.current_reps);
    Ok(())
}

fn cmd_status(config: &Config) -> Result<()> {
    let session = open_session(config)?;
    let now = Utc::now();
    let status = session.observe(now);

    let state = match session.snapshot() {
        Some(state) if state.is_setup_complete => state,
        _ => {
            println!("No workout set up yet.");
            println!("  Run: gtg setup --exercise <name> --max-reps <n> --rest <minutes>");
            return Ok(());
        }
    };

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {}", state.exercise_name.to_uppercase());
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  Target: {} reps", state.current_reps);
    println!("  Max: {} reps", state.max_reps);
    println!("  Rest: {} minutes", state.rest_duration_minutes);
    println!();

    match status.phase {
        SessionPhase::Resting => {
            println!("  Resting... {} left", format_remaining(status.remaining));
        }
        _ => println!("  Ready for next set"),
    }
    println!();
    Ok(())
}

fn cmd_done(config: &Config, rpe: i32) -> Result<()> {
    let mut session = open_session(config)?;
    let now = Utc::now();
    let outcome = session.complete_set(rpe, now)?;

    let exercise_name = session
        .snapshot()
        .map(|state| state.exercise_name.clone())
        .unwrap_or_default();

    let record = SetRecord {
        id: uuid::Uuid::new_v4(),
        exercise_name,
        target_reps: outcome.target_reps,
        difficulty: outcome.difficulty,
        next_reps: outcome.next_reps,
        completed_at: now,
    };

    // The transition is already persisted and scheduled; a journal failure only costs history
    let mut log = JsonlSetLog::new(config.data.set_log_path());
    if let Err(e) = log.append(&record) {
        tracing::warn!("Failed to journal set: {}", e);
    }

    println!("\n✓ Set logged!");
    println!("  Next target: {} reps", outcome.next_reps);
    println!(
        "  Rest until: {}",
        outcome
            .rest_ends_at
            .with_timezone(&chrono::Local)
            .format("%H:%M")
    );
    Ok(())
}

fn cmd_notify(config: &Config, at: DateTime<Utc>) -> Result<()> {
    let mut queue = FileJobQueue::new(config.data.jobs_path());
    let mut sink = GatedSink::new(ConsoleSink, config.notifications.enabled);

    let fired = queue.run_due(at, &config.notifications.title, &mut sink)?;
    if fired == 0 {
        println!("No reminders due.");
    }
    Ok(())
}

fn cmd_history(config: &Config, limit: usize) -> Result<()> {
    let sets = recent_sets(&config.data.set_log_path(), limit)?;
    if sets.is_empty() {
        println!("No sets logged yet.");
        return Ok(());
    }

    for set in sets {
        println!(
            "  {}  {} x{}  RPE {}  → next {}",
            set.completed_at
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M"),
            set.exercise_name,
            set.target_reps,
            set.difficulty.value(),
            set.next_reps
        );
    }
    Ok(())
}

fn cmd_reset(config: &Config) -> Result<()> {
    let mut session = open_session(config)?;
    session.reset()?;
    println!("✓ Workout reset.");
    Ok(())
}

fn format_remaining(remaining: Duration) -> String {
    let total = remaining.num_seconds().max(0);
    format!("{:02}:{:02}", total / 60, total % 60)
}
