use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::api::BackendClient;
use crate::core::{AppConfig, Credentials};
use crate::notify::{ManualProvider, NotificationStore};
use crate::session::Session;

fn print_new(store: &NotificationStore, seen: &mut HashSet<String>) {
    // Newest first in the store, print oldest first
    for record in store.records().iter().rev() {
        if seen.insert(record.id.clone()) {
            println!(
                "[{}] {}: {}",
                record.received_at.to_rfc3339(),
                record.title,
                record.body
            );
        }
    }
}

pub async fn run(token: String, device_token: Option<String>) -> Result<()> {
    let config = AppConfig::default();
    let client = Arc::new(BackendClient::from_config(&config)?);
    let provider = Arc::new(ManualProvider::new(device_token));
    let mut session = Session::start(
        &config,
        provider.clone(),
        client,
        Credentials::new(Some(token)),
    );

    if let Some(outcome) = session.registration().await {
        tracing::info!("Push registration finished: {:?}", outcome);
    }

    let store = session.store().clone();
    let mut unread = store.subscribe();
    let printer = tokio::spawn(async move {
        let mut seen = HashSet::new();
        while unread.changed().await.is_ok() {
            print_new(&store, &mut seen);
            println!("unread: {}", store.unread_count());
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line {
            "" => continue,
            "/read-all" => session.store().mark_all_read(),
            "/clear" => session.store().clear(),
            payload => match provider.deliver_json(payload) {
                Ok(true) => {}
                Ok(false) => tracing::warn!("No foreground subscriber, message dropped"),
                Err(err) => tracing::warn!("{:#}", err),
            },
        }
    }

    let total = session.store().len();
    session.end().await;
    printer.abort();
    println!("Session ended after {} notifications", total);
    Ok(())
}
