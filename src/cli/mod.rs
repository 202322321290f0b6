use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod feed;
pub mod listen;
pub mod register;

#[derive(Subcommand)]
enum Command {
    /// Print historical notifications page by page
    Feed {
        /// Bearer token of the logged in user
        #[arg(long, env = "NUHOUD_AUTH_TOKEN")]
        token: String,

        /// Page size, clamped to 1..=50
        #[arg(long)]
        limit: Option<usize>,

        /// Maximum number of pages to fetch
        #[arg(long, default_value = "1")]
        pages: usize,
    },
    /// Submit a device registration token to the backend
    Register {
        #[arg(long, env = "NUHOUD_AUTH_TOKEN")]
        token: String,

        #[arg(long)]
        device_token: String,
    },
    /// Start a session and route push messages read from stdin, one
    /// JSON payload per line
    Listen {
        #[arg(long, env = "NUHOUD_AUTH_TOKEN")]
        token: String,

        #[arg(long)]
        device_token: Option<String>,
    },
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=info", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();
    init_tracing();

    match args.command {
        Some(Command::Feed {
            token,
            limit,
            pages,
        }) => {
            feed::run(token, limit, pages).await?;
        }
        Some(Command::Register {
            token,
            device_token,
        }) => {
            register::run(token, device_token).await?;
        }
        Some(Command::Listen {
            token,
            device_token,
        }) => {
            listen::run(token, device_token).await?;
        }
        None => {}
    }

    Ok(())
}
