//! Peg store errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Cannot give a peg to yourself")]
    SelfPeg,

    #[error("{sender} has already given all {allowance} pegs")]
    NoPegsLeft { sender: String, allowance: usize },

    #[error("No peg from {sender} to {recipient} to take back")]
    NoPegToTakeBack { sender: String, recipient: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
