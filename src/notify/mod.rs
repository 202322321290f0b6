pub mod manual;
pub mod models;
pub mod provider;
pub mod registrar;
pub mod router;
pub mod store;

pub use manual::ManualProvider;
pub use models::*;
pub use provider::{NotificationProvider, Permission, TokenRequest, WorkerRegistration};
pub use registrar::{FailureKind, RegistrationOutcome, SkipReason, TokenRegistrar, TokenSink};
pub use router::{RouterHandle, spawn_foreground_router};
pub use store::{MAX_LIVE_NOTIFICATIONS, NotificationStore};
