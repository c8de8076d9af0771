use clap::{Args, Parser, Subcommand};
use std::time::Duration;
use terra_session_cli::{run_demo, run_online, LogConfig, OnlineOptions, Result};
use terra_session_p2p::application::DEFAULT_SERVICE_TYPE;
use tracing::info;

#[derive(Parser)]
#[command(name = "terra-cli")]
#[command(
    version,
    about = "TerraGames CLI - peer-to-peer base defense sessions"
)]
struct Cli {
    /// Verbose logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Only log warnings
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct NetworkArgs {
    /// Matchbox signalling server URL
    #[arg(short = 's', long, default_value = "ws://localhost:3536")]
    server: String,

    /// Display name announced to the other peer
    #[arg(short = 'n', long)]
    name: String,

    /// Service type; both peers must use the same one
    #[arg(long, default_value = DEFAULT_SERVICE_TYPE)]
    service: String,

    /// Seconds an invitation may stay unanswered
    #[arg(long, default_value_t = 10)]
    invite_timeout: u64,

    /// Milliseconds between automatic volleys
    #[arg(long, default_value_t = 800)]
    volley_ms: u64,

    /// Report the loss of our base after this many volleys
    #[arg(long)]
    lose_after: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse for a guest and invite it
    Host(NetworkArgs),

    /// Advertise and accept the first invitation
    Join(NetworkArgs),

    /// Play a scripted match between two in-process peers
    Demo {
        /// Number of volleys each side fires
        #[arg(long, default_value_t = 3)]
        volleys: usize,
    },
}

impl NetworkArgs {
    fn into_options(self, is_host: bool) -> OnlineOptions {
        OnlineOptions {
            server: self.server,
            service_type: self.service,
            name: self.name,
            is_host,
            invite_timeout: Duration::from_secs(self.invite_timeout),
            volley_interval: Duration::from_millis(self.volley_ms),
            lose_after: self.lose_after,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_config = if cli.verbose {
        LogConfig::dev()
    } else if cli.quiet {
        LogConfig::quiet()
    } else {
        LogConfig::default()
    };
    log_config.init()?;

    match cli.command {
        Commands::Host(args) => run_online(args.into_options(true)).await?,
        Commands::Join(args) => run_online(args.into_options(false)).await?,
        Commands::Demo { volleys } => {
            let report = run_demo(DEFAULT_SERVICE_TYPE, volleys)?;
            info!("");
            info!("Demo finished:");
            info!(
                "  Alice saw {} projectiles, Bob saw {}",
                report.host_materialized, report.guest_materialized
            );
            info!(
                "  Game over: Alice {}, Bob {}",
                report.host_game_over, report.guest_game_over
            );
        }
    }

    Ok(())
}
