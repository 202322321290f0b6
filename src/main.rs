use anyhow::Result;
use nuhoud_notify::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
