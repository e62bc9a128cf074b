//! Fetcher collaborator: retrieves one URL to a file, reporting progress.

mod error;
mod http;
mod traits;
mod types;

pub use error::FetchError;
pub use http::HttpFetcher;
pub use traits::Fetcher;
pub use types::{FetchProgress, FetchRequest, FetchedFile, FetcherConfig};
