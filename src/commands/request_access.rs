use anyhow::Result;

use crate::access::{AccessNotifier, AccessRequest};

/// Send an access request to the configured webhook.
#[tracing::instrument(skip(notifier))]
pub async fn request_access(
    notifier: &AccessNotifier,
    discord_username: &str,
    minecraft_username: &str,
) -> Result<()> {
    let request = AccessRequest::new(discord_username, minecraft_username);
    notifier.send(&request).await?;
    println!("Access request sent for {}.", request.minecraft_username);
    Ok(())
}
