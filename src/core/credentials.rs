//! Bearer credential for the current session.
//!
//! Absence of a credential means the user is logged out. Components
//! that talk to the backend read it synchronously at the moment they
//! need it, and the feed loader additionally watches it for changes.

use std::sync::Arc;

use tokio::sync::watch;

/// Synchronous accessor for the current bearer token.
pub trait CredentialSource: Send + Sync {
    fn current_token(&self) -> Option<String>;
}

/// Cloneable handle to the session's bearer token.
#[derive(Clone, Debug)]
pub struct Credentials {
    sender: Arc<watch::Sender<Option<String>>>,
}

impl Credentials {
    pub fn new(token: Option<String>) -> Self {
        let (sender, _) = watch::channel(normalize(token));
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn logged_out() -> Self {
        Self::new(None)
    }

    /// Replace the credential. Watchers are only woken when the value
    /// actually changes.
    pub fn set(&self, token: Option<String>) {
        let token = normalize(token);
        self.sender.send_if_modified(|current| {
            if *current == token {
                false
            } else {
                *current = token;
                true
            }
        });
    }

    pub fn logout(&self) {
        self.set(None);
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.sender.subscribe()
    }
}

impl CredentialSource for Credentials {
    fn current_token(&self) -> Option<String> {
        self.sender.borrow().clone()
    }
}

// An empty string is as good as no credential at all
fn normalize(token: Option<String>) -> Option<String> {
    token.filter(|t| !t.trim().is_empty())
}
