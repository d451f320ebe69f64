//! Wire message envelope exchanged with editor clients.
//!
//! Every frame in both directions is a flat JSON object with a `type`
//! discriminator. Clients send `execute` requests; the server replies with
//! `output` and `error` messages carrying captured text.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A decoded request to run a code snippet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteRequest {
    /// The source text, exactly as the client sent it.
    pub code: String,
}

/// Reasons an inbound frame could not be decoded.
///
/// All variants are reported to the client and leave the channel open.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// The frame is not a JSON object.
    #[error("frame is not a valid JSON message")]
    MalformedPayload,

    /// The `type` field is missing or not `"execute"`.
    #[error("unsupported message type")]
    UnsupportedType,

    /// An `execute` frame with no usable `code` string.
    #[error("execute request carries no code")]
    MissingCode,
}

impl DecodeError {
    /// Fixed text reported to the client for each decode failure.
    pub fn client_message(self) -> &'static str {
        match self {
            Self::MalformedPayload => "Invalid message format",
            Self::UnsupportedType => "Invalid message type",
            Self::MissingCode => "No code provided",
        }
    }
}

/// Decode one inbound text frame into an [`ExecuteRequest`].
///
/// The code string is returned unchanged: no trimming and no syntax
/// validation happen at this layer.
pub fn decode(raw: &str) -> Result<ExecuteRequest, DecodeError> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|_| DecodeError::MalformedPayload)?;
    let frame = value.as_object().ok_or(DecodeError::MalformedPayload)?;

    if frame.get("type").and_then(serde_json::Value::as_str) != Some("execute") {
        return Err(DecodeError::UnsupportedType);
    }

    match frame.get("code").and_then(serde_json::Value::as_str) {
        Some(code) if !code.is_empty() => Ok(ExecuteRequest {
            code: code.to_owned(),
        }),
        _ => Err(DecodeError::MissingCode),
    }
}

/// Server-to-client message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outbound {
    /// Captured standard output, or a control notice.
    Output { content: String },
    /// Captured standard error, or a protocol-level error notice.
    Error { content: String },
}

impl Outbound {
    pub fn output(content: impl Into<String>) -> Self {
        Self::Output {
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self::Error {
            content: content.into(),
        }
    }

    /// The message payload, regardless of variant.
    pub fn content(&self) -> &str {
        match self {
            Self::Output { content } | Self::Error { content } => content,
        }
    }
}
