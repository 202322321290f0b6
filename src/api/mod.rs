pub mod client;
pub mod public;

pub use client::BackendClient;
pub use public::{FeedEntry, FeedPage, ResponseError, TokenRegistrationRequest};
