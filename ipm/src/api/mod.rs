//! HTTP access to the management API

mod client;
mod error;
mod transport;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use client::{Client, ClientConfig};
pub use error::ApiError;
pub use reqwest::Method;
pub use transport::Transport;
