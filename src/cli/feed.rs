use std::sync::Arc;

use anyhow::{Result, anyhow};

use crate::api::BackendClient;
use crate::core::{AppConfig, Credentials};
use crate::feed::{FeedLoader, LoadStatus};

pub async fn run(token: String, limit: Option<usize>, pages: usize) -> Result<()> {
    let config = AppConfig::default();
    let client = Arc::new(BackendClient::from_config(&config)?);
    let credentials = Credentials::new(Some(token));
    let loader = FeedLoader::mount(
        client,
        &credentials,
        limit.unwrap_or(config.feed_page_size),
    );

    let mut printed = 0;
    let mut fetched = 0;
    loop {
        let state = loader.settled().await;
        if state.status == LoadStatus::Error {
            return Err(anyhow!(
                "Failed to load notifications: {}",
                state.error.unwrap_or_default()
            ));
        }
        fetched += 1;

        for entry in &state.items[printed..] {
            let when = entry.created_at.as_deref().unwrap_or("-");
            let marker = if entry.read { " " } else { "*" };
            println!("{} {} {}\n    {}", marker, when, entry.title, entry.body);
        }
        printed = state.items.len();

        if !state.has_more || fetched >= pages || !loader.load_more() {
            println!(
                "\n{} notifications{}",
                printed,
                if state.has_more { ", more available" } else { "" }
            );
            break;
        }
    }

    Ok(())
}
