use std::time::Duration;

use anyhow::Result;
use log::warn;
use tokio::sync::watch;

use crate::status::{ServerStatus, StatusClient, StatusPoller, StatusSettings};

const FETCH_FAILED: &str = "Failed to fetch server status";

/// Print the server status once, or keep printing updates with `follow`.
#[tracing::instrument(skip(client, settings))]
pub async fn status(
    client: StatusClient,
    settings: StatusSettings,
    follow: bool,
    interval: Duration,
) -> Result<()> {
    let fallback = ServerStatus::fallback(&settings);
    let address = fallback.ip.clone().unwrap_or_default();

    if !follow {
        match client.fetch(&address).await {
            Ok(status) => print!("{}", render_status(&status, None)),
            Err(e) => {
                warn!("{}: {:#}", FETCH_FAILED, e);
                print!("{}", render_status(&fallback, Some(FETCH_FAILED)));
            }
        }
        return Ok(());
    }

    let (sender, mut receiver) = watch::channel(None);
    let poller = StatusPoller::new(client, address).with_interval(interval);
    let handle = tokio::spawn(poller.run(sender));

    print!("{}", render_status(&fallback, Some("Checking...")));
    loop {
        tokio::select! {
            changed = receiver.changed() => {
                if changed.is_err() {
                    break;
                }
                if let Some(status) = receiver.borrow_and_update().as_ref() {
                    println!();
                    print!("{}", render_status(status, None));
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    drop(receiver);
    handle.await?;
    Ok(())
}

/// Plain-text rendering; `note` replaces the MOTD line when set.
pub(crate) fn render_status(status: &ServerStatus, note: Option<&str>) -> String {
    let state = if status.online { "Online" } else { "Offline" };
    format!(
        "Server Status: {}\n{}\nPlayers: {} of {} max\nVersion: {}\n",
        state,
        note.unwrap_or_else(|| status.headline()),
        status.players.online,
        status.players.max,
        status.version
    )
}
