// Roombook - room schedule viewer
// Prints one room's bookings in the viewer's timezone

use anyhow::{Context, Result};
use chrono::Utc;
use log::{info, warn};
use roombook::calendar::window;
use roombook::utils::logging::{init_logging, log_error_with_context};
use roombook::{AppState, ClientConfig};

#[tokio::main]
async fn main() {
    if let Err(e) = init_logging() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    if let Err(e) = run().await {
        log_error_with_context(&e, "roombook");
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let room_id = std::env::args()
        .nth(1)
        .filter(|arg| !arg.trim().is_empty())
        .context("usage: roombook <room-id>")?;

    let config = ClientConfig::from_env().context("Failed to load configuration")?;
    let tz = config.timezone;
    let state = AppState::connect(config).context("Failed to set up HTTP client")?;

    let heading = match state.rooms.get_room(&room_id).await {
        Ok(room) => match room.availability_level() {
            Some(level) => format!("{} ({} seats, availability {:?})", room.name, room.capacity, level),
            None => format!("{} ({} seats)", room.name, room.capacity),
        },
        Err(e) => {
            warn!("Room details unavailable: {}", e);
            format!("Room {}", room_id)
        }
    };

    let events = state
        .cache
        .events(&room_id)
        .await
        .with_context(|| format!("Failed to load schedule for room {}", room_id))?;
    info!("Fetched {} events for room {}", events.len(), room_id);

    let mut sorted: Vec<_> = events.iter().collect();
    sorted.sort_by_key(|event| event.start);

    let now = Utc::now();
    println!("{} - times in {}", heading, tz.name());
    if sorted.is_empty() {
        println!("  No bookings.");
    }
    for event in sorted {
        let start = window::localize(event.start, tz);
        let end = window::localize(event.end, tz);
        println!(
            "  {} {}-{}  [{:<9}] {} ({}, {})",
            start.format("%a %Y-%m-%d"),
            start.format("%H:%M"),
            end.format("%H:%M"),
            event.status_at(now).as_str(),
            event.title,
            event.organizer.name,
            event.meeting_type_label()
        );
    }

    state.shutdown();
    Ok(())
}
