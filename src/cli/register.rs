use std::sync::Arc;

use anyhow::{Result, anyhow};

use crate::api::BackendClient;
use crate::core::{AppConfig, Credentials};
use crate::notify::{ManualProvider, RegistrationOutcome, TokenRegistrar};

pub async fn run(token: String, device_token: String) -> Result<()> {
    let config = AppConfig::default();
    let client = Arc::new(BackendClient::from_config(&config)?);
    let provider = Arc::new(ManualProvider::new(Some(device_token)));
    let registrar = TokenRegistrar::new(
        &config,
        provider,
        client,
        Arc::new(Credentials::new(Some(token))),
    );

    match registrar.register().await {
        RegistrationOutcome::Registered | RegistrationOutcome::Unchanged => {
            println!("Device token registered");
            Ok(())
        }
        outcome => Err(anyhow!("Registration did not complete: {:?}", outcome)),
    }
}
