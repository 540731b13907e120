//! Webex REST API client.

mod client;
mod error;
mod receiver;
mod types;

pub use client::WebexClient;
pub use error::WebexError;
pub use receiver::MessageReceiver;
pub use types::*;
