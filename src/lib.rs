// SWS SDK - client library for the Serato Web Services

pub mod auth;
pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod firewall;
pub mod http_client;
pub mod request;
pub mod response;
pub mod service;
pub mod services;

pub use client::SwsClient;
pub use config::ClientConfig;
pub use error::{Result, SdkError};
pub use firewall::{FirewallHeader, HeaderGenerator};
pub use response::ApiResponse;
pub use service::ServiceName;
