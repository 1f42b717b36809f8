pub mod stw;

use reqwest::StatusCode;
use thiserror::Error;

use crate::models::ReplyStatus;

/// Acknowledgement of an accepted mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ack {
    pub status: Option<ReplyStatus>,
    pub post_key: Option<String>,
    /// Raw reply body.
    pub body: String,
}

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("server kept answering with its bot check page")]
    BotCheck,

    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
}
