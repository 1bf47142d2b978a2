pub mod fetcher;
pub mod http_client;

pub use fetcher::Fetcher;
pub use http_client::HttpFetcher;
