pub mod config;
pub mod credentials;
pub mod ids;

pub use config::AppConfig;
pub use credentials::{CredentialSource, Credentials};
pub use ids::generate_id;
