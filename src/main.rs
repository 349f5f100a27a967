//! EyeGuard - rest reminder daemon.
//!
//! Runs the reminder service on its scheduling thread until Ctrl+C, which
//! also performs the final usage save.

use eyeguard::config::Config;
use eyeguard::monitor::driver::{command_channel, spawn_scheduler_thread, DriverConfig};
use eyeguard::platform::{MediaAudioActivity, NullScreen, SystemCursor, TipWindowManager};
use eyeguard::service::{Collaborators, PresenceEvent, ReminderService};
use eyeguard::store::{MemoryCache, UsageStatistics};
use eyeguard::timer::SystemClock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tokio::sync::broadcast::error::RecvError;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("eyeguard=info")),
        )
        .init();

    println!("╔════════════════════════════════════════════════════════════╗");
    println!("║              EyeGuard - Rest Reminder                      ║");
    println!("╚════════════════════════════════════════════════════════════╝");
    println!();

    println!("🔧 Loading configuration...");
    let config = Config::load_or_default()?;
    println!(
        "   ✓ Reminder every {} min ({:?} profile)",
        config.warn_time, config.profile
    );

    println!("🔧 Opening usage database...");
    let statistics = UsageStatistics::open_default()?;
    println!("   ✓ Database ready");

    let (handle, commands) = command_channel();
    let service = ReminderService::new(
        config,
        Arc::new(SystemClock::new()),
        Collaborators {
            cursor: Box::new(SystemCursor),
            audio: Box::new(MediaAudioActivity),
            cache: Arc::new(MemoryCache::new()),
            windows: Box::new(TipWindowManager::new(handle.clone())),
            statistics: Box::new(statistics),
            screen: Box::new(NullScreen::new()),
        },
    )?;

    // Log presence changes
    let mut events = service.subscribe();
    thread::spawn(move || {
        loop {
            match events.blocking_recv() {
                Ok(PresenceEvent::UserLeft { .. }) => tracing::info!("Away from the screen"),
                Ok(PresenceEvent::UserReturned { .. }) => tracing::info!("Back at the screen"),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Presence event logger lagging");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_ctrlc = Arc::clone(&shutdown);
    let handle_ctrlc = handle.clone();
    ctrlc::set_handler(move || {
        println!("\n🛑 Shutdown signal received...");
        shutdown_ctrlc.store(true, Ordering::SeqCst);
        handle_ctrlc.exit();
    })?;

    println!("🔧 Starting scheduler...");
    let scheduler = spawn_scheduler_thread(service, commands, shutdown, DriverConfig::default());
    println!("   ✓ Scheduler running, press Ctrl+C to quit");
    println!();

    let result = match scheduler.join() {
        Ok(result) => result,
        Err(_) => {
            tracing::error!("Scheduler thread panicked");
            return Err("scheduler thread panicked".into());
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Scheduler stopped with an error");
    }

    println!("\n👋 EyeGuard has exited. Goodbye!");
    result.map_err(Into::into)
}
