use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use packboard::commands::{self, Config, InfoOptions, ModsOptions, Settings};
use packboard::status::StatusSettings;

/// packboard - mod list and server status for a community game server
///
/// Resolves the latest release of a modpack on Modrinth and lists its mods,
/// reports the game server's status, and forwards access requests to a
/// webhook.
///
/// If the MODRINTH_TOKEN environment variable is set, it will be sent with
/// catalog requests.
///
/// Examples:
///   packboard mods --pack my-pack --game-version 1.20.1 --search torch
///   packboard info --pack my-pack --game-version 1.20.1
///   packboard status --server mc.example.net --watch
#[derive(Parser, Debug)]
#[command(author, version = env!("PACKBOARD_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Catalog API URL (defaults to https://api.modrinth.com/v2)
    #[arg(long = "api-url", env = "PACKBOARD_API_URL", value_name = "URL", global = true)]
    pub api_url: Option<String>,

    /// Server status API URL (defaults to https://api.mcsrvstat.us)
    #[arg(
        long = "status-api-url",
        env = "PACKBOARD_STATUS_API_URL",
        value_name = "URL",
        global = true
    )]
    pub status_api_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(
        long = "timeout",
        env = "PACKBOARD_TIMEOUT",
        value_name = "SECS",
        default_value_t = 15,
        global = true
    )]
    pub timeout: u64,

    /// Modrinth API token
    #[arg(long = "token", env = "MODRINTH_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// List the mods of the latest modpack release
    Mods(ModsArgs),

    /// Show the latest modpack release and its download link
    Info(InfoArgs),

    /// Show the game server status
    Status(StatusArgs),

    /// Send an access request to the server admins
    RequestAccess(RequestAccessArgs),
}

#[derive(clap::Args, Debug)]
pub struct ModsArgs {
    /// Modpack project ID or slug
    #[arg(long = "pack", env = "PACKBOARD_PACK_ID", value_name = "ID")]
    pub pack: Option<String>,

    /// Mod loader the release must target
    #[arg(long = "loader", default_value = packboard::catalog::DEFAULT_LOADER)]
    pub loader: String,

    /// Game version the release must target
    #[arg(long = "game-version", env = "PACKBOARD_GAME_VERSION", value_name = "VERSION")]
    pub game_version: Option<String>,

    /// Only show mods whose name or description contains this text
    #[arg(long = "search", short = 's', default_value = "")]
    pub search: String,

    /// Only show mods in this category
    #[arg(long = "category", short = 'c', default_value = packboard::aggregator::ALL_CATEGORY)]
    pub category: String,

    /// Maximum concurrent project requests (0 = unbounded)
    #[arg(long = "concurrency", default_value_t = 0)]
    pub concurrency: usize,

    /// Print JSON instead of text
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(clap::Args, Debug)]
pub struct InfoArgs {
    /// Modpack project ID or slug
    #[arg(long = "pack", env = "PACKBOARD_PACK_ID", value_name = "ID")]
    pub pack: Option<String>,

    /// Mod loader the release must target
    #[arg(long = "loader", default_value = packboard::catalog::DEFAULT_LOADER)]
    pub loader: String,

    /// Game version the release must target
    #[arg(long = "game-version", env = "PACKBOARD_GAME_VERSION", value_name = "VERSION")]
    pub game_version: Option<String>,

    /// Name shown when the catalog cannot be reached
    #[arg(long = "pack-name", env = "PACKBOARD_MODPACK_NAME", value_name = "NAME")]
    pub pack_name: Option<String>,

    /// Version shown when the catalog cannot be reached
    #[arg(long = "pack-version", env = "PACKBOARD_MODPACK_VERSION", value_name = "VERSION")]
    pub pack_version: Option<String>,

    /// Print JSON instead of text
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(clap::Args, Debug)]
pub struct StatusArgs {
    /// Game server address
    #[arg(long = "server", env = "PACKBOARD_SERVER_IP", value_name = "ADDR")]
    pub server: Option<String>,

    /// Version shown while the real status is unknown
    #[arg(long = "game-version", env = "PACKBOARD_GAME_VERSION", value_name = "VERSION")]
    pub game_version: Option<String>,

    /// Description shown while the real status is unknown
    #[arg(long = "description", env = "PACKBOARD_SERVER_DESCRIPTION")]
    pub description: Option<String>,

    /// Keep polling and print every update
    #[arg(long = "watch", short = 'w')]
    pub watch: bool,

    /// Poll interval in seconds
    #[arg(long = "interval", value_name = "SECS", default_value_t = 300)]
    pub interval: u64,
}

#[derive(clap::Args, Debug)]
pub struct RequestAccessArgs {
    /// Discord username
    #[arg(long = "discord", value_name = "NAME")]
    pub discord: String,

    /// Minecraft username
    #[arg(long = "minecraft", value_name = "NAME")]
    pub minecraft: String,

    /// Webhook receiving the request
    #[arg(long = "webhook", env = "PACKBOARD_WEBHOOK_URL", value_name = "URL")]
    pub webhook: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let webhook_url = match &cli.command {
        Commands::RequestAccess(args) => args.webhook.clone(),
        _ => None,
    };
    let config = Config::new(Settings {
        api_url: cli.api_url,
        status_api_url: cli.status_api_url,
        timeout: Duration::from_secs(cli.timeout),
        token: cli.token,
        webhook_url,
    })?;

    match cli.command {
        Commands::Mods(args) => {
            let options = ModsOptions {
                pack_id: args.pack,
                loader: args.loader,
                game_version: args.game_version,
                search: args.search,
                category: args.category,
                concurrency: args.concurrency,
                json: args.json,
            };
            commands::mods(config.catalog, options, config.timeout).await?
        }
        Commands::Info(args) => {
            let options = InfoOptions {
                pack_id: args.pack,
                loader: args.loader,
                game_version: args.game_version,
                pack_name: args.pack_name,
                pack_version: args.pack_version,
                json: args.json,
            };
            commands::info(config.catalog, options).await?
        }
        Commands::Status(args) => {
            let settings = StatusSettings {
                server_address: args.server,
                game_version: args.game_version,
                description: args.description,
            };
            commands::status(
                config.status,
                settings,
                args.watch,
                Duration::from_secs(args.interval),
            )
            .await?
        }
        Commands::RequestAccess(args) => {
            commands::request_access(&config.notifier, &args.discord, &args.minecraft).await?
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_mods_parsing() {
        let cli = Cli::try_parse_from([
            "packboard",
            "mods",
            "--pack",
            "pack-1",
            "--game-version",
            "1.20.1",
            "-s",
            "torch",
        ])
        .unwrap();
        match cli.command {
            Commands::Mods(args) => {
                assert_eq!(args.pack.as_deref(), Some("pack-1"));
                assert_eq!(args.game_version.as_deref(), Some("1.20.1"));
                assert_eq!(args.loader, "neoforge");
                assert_eq!(args.search, "torch");
                assert_eq!(args.category, "All");
                assert_eq!(args.concurrency, 0);
                assert!(!args.json);
            }
            _ => panic!("Expected Mods command"),
        }
        assert_eq!(cli.timeout, 15);
    }

    #[test]
    fn test_cli_global_api_url_parsing() {
        let cli = Cli::try_parse_from([
            "packboard",
            "--api-url",
            "http://localhost:1234",
            "mods",
            "--pack",
            "p",
        ])
        .unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("http://localhost:1234"));
    }

    #[test]
    fn test_cli_info_parsing() {
        let cli = Cli::try_parse_from([
            "packboard",
            "info",
            "--pack",
            "pack-1",
            "--pack-name",
            "Our Pack",
            "--pack-version",
            "v3",
        ])
        .unwrap();
        match cli.command {
            Commands::Info(args) => {
                assert_eq!(args.pack.as_deref(), Some("pack-1"));
                assert_eq!(args.loader, "neoforge");
                assert_eq!(args.pack_name.as_deref(), Some("Our Pack"));
                assert_eq!(args.pack_version.as_deref(), Some("v3"));
                assert!(!args.json);
            }
            _ => panic!("Expected Info command"),
        }
    }

    #[test]
    fn test_cli_status_parsing() {
        let cli = Cli::try_parse_from([
            "packboard",
            "status",
            "--server",
            "mc.example.net",
            "--watch",
            "--interval",
            "60",
        ])
        .unwrap();
        match cli.command {
            Commands::Status(args) => {
                assert_eq!(args.server.as_deref(), Some("mc.example.net"));
                assert!(args.watch);
                assert_eq!(args.interval, 60);
            }
            _ => panic!("Expected Status command"),
        }
    }

    #[test]
    fn test_cli_request_access_requires_names() {
        let result = Cli::try_parse_from(["packboard", "request-access", "--discord", "someone"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_no_subcommand_fails() {
        let result = Cli::try_parse_from(["packboard"]);
        assert!(result.is_err());
    }
}
