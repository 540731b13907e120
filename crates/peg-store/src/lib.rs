//! Peg ledger, user directory and runtime settings for the peg bot.

mod error;
mod settings;
mod store;
mod types;

pub use error::StoreError;
pub use settings::Settings;
pub use store::PegStore;
pub use types::*;
