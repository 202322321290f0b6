pub mod loader;

pub use loader::{FeedLoader, FeedSource, FeedState, LoadStatus};
