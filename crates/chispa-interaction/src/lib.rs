//! Backend HTTP surface: configuration, the retrying JSON client, and the
//! [`TarotBackend`] seam the controllers consume.

pub mod backend;
pub mod client;
pub mod config;
pub mod http_backend;

pub use backend::TarotBackend;
pub use client::ApiClient;
pub use config::BackendConfig;
pub use http_backend::HttpTarotBackend;
