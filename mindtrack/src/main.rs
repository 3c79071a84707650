// MindTrack - mood tracking notifier
// Entry point and command-line front end

use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};
use mindtrack::app;
use mindtrack::models::{NotificationEvent, PermissionState};
use mindtrack::platform::PlatformPermission;
use mindtrack::services::slots;
use mindtrack::services::TimeOfDay;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Deliver scheduled notifications until interrupted
    ///
    /// Example: mindtrack run
    Run,
    /// Record a completed PHQ-5 assessment now
    ///
    /// Example: mindtrack complete-assessment
    CompleteAssessment,
    /// Show permission, settings and upcoming notifications
    ///
    /// Example: mindtrack status
    Status,
    /// Print a motivational quote
    ///
    /// Example: mindtrack quote --time-of-day evening
    Quote {
        #[arg(long, value_name = "BUCKET")]
        time_of_day: Option<TimeOfDay>,
    },
    /// Forget the stored notification permission decision
    ///
    /// Example: mindtrack reset-permission
    ResetPermission,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mindtrack=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let state = app::setup().context("failed to initialize application")?;

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run(&state).await,
        Command::CompleteAssessment => complete_assessment(&state).await,
        Command::Status => status(&state).await,
        Command::Quote { time_of_day } => {
            let quote = match time_of_day {
                Some(time_of_day) => state.quotes.pick_quote(time_of_day),
                None => state.quotes.pick_any_quote(),
            };
            println!("{}", quote.as_body());
            Ok(())
        }
        Command::ResetPermission => {
            state
                .settings
                .set_permission(PlatformPermission::Default)
                .await?;
            println!("Notification permission reset; you will be asked again on next run");
            Ok(())
        }
    }
}

async fn run(state: &app::AppState) -> anyhow::Result<()> {
    tracing::info!("Starting MindTrack notifier");

    let notifications = &state.notifications;
    let mut events = notifications.subscribe();

    if notifications.init().await == PermissionState::Pending {
        match notifications.request_permission().await {
            Ok(answer) => tracing::info!("Permission prompt finished: {:?}", answer),
            Err(e) => tracing::warn!("Notifications stay off: {}", e),
        }
    }

    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            if let NotificationEvent::Navigate { url } = event {
                println!("Open MindTrack at {}", url);
            }
        }
    });

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;

    tracing::info!("Shutting down");
    notifications.teardown().await;
    printer.abort();
    Ok(())
}

async fn complete_assessment(state: &app::AppState) -> anyhow::Result<()> {
    state.notifications.record_assessment_completion().await?;

    let now = Local::now().naive_local();
    let last = state.notifications.ledger().last_completion().await?;
    let due = slots::next_assessment_due(now, last);
    println!("Assessment recorded. Next reminder: {}", due.format("%Y-%m-%d %H:%M"));
    Ok(())
}

async fn status(state: &app::AppState) -> anyhow::Result<()> {
    // Read-only: no worker registration, no timers
    let notifications = &state.notifications;
    let permission = notifications.stored_permission().await;
    let settings = state.settings.load().await?;
    let last = notifications.ledger().last_completion().await?;

    println!("Permission:      {:?}", permission);
    println!("Check-ins:       {}", settings.notifications.mood_check_ins);
    println!("Quotes:          {}", settings.notifications.quotes);
    println!("Weekly PHQ-5:    {}", settings.notifications.weekly_assessment);
    match last {
        Some(last) => println!("Last assessment: {}", last.format("%Y-%m-%d %H:%M")),
        None => println!("Last assessment: never"),
    }

    if permission != PermissionState::Granted {
        return Ok(());
    }

    let now = Local::now().naive_local();
    let upcoming = slots::planned_fires(now, last, &settings.notifications);
    if !upcoming.is_empty() {
        println!("Upcoming:");
        for (fire_at, kind) in upcoming {
            println!("  {}  {}", fire_at.format("%Y-%m-%d %H:%M"), kind.as_str());
        }
    }
    Ok(())
}
