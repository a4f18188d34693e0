use std::fmt;

use anyhow::{anyhow, Context};
use serde_json::json;

/// Message fragment older board servers put in the body of a rejected like
/// when the like already exists
// TODO: drop once every board returns a typed `conflict` body
pub const ALREADY_LIKED_MARKER: &str = "이미 좋아요";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConflictReason {
    /// The like being added is already recorded server-side
    AlreadyLiked,

    /// The like being removed does not exist server-side
    NotLiked,
}

impl ConflictReason {
    fn tag(&self) -> &'static str {
        match self {
            ConflictReason::AlreadyLiked => "already-liked",
            ConflictReason::NotLiked => "not-liked",
        }
    }

    fn from_tag(tag: &str) -> Option<ConflictReason> {
        match tag {
            "already-liked" => Some(ConflictReason::AlreadyLiked),
            "not-liked" => Some(ConflictReason::NotLiked),
            _ => None,
        }
    }
}

impl fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictReason::AlreadyLiked => write!(f, "comment is already liked"),
            ConflictReason::NotLiked => write!(f, "comment is not liked"),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Authentication required")]
    AuthRequired,

    #[error("Conflict: {0}")]
    Conflict(ConflictReason),

    #[error("Comment not found")]
    NotFound,

    #[error("Invalid request: {0}")]
    Validation(String),
}

impl Error {
    pub fn status_code(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            Error::ServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::AuthRequired => StatusCode::UNAUTHORIZED,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn contents(&self) -> Vec<u8> {
        serde_json::to_vec(&match self {
            Error::ServerError(msg) => json!({
                "message": msg,
                "type": "server-error",
            }),
            Error::AuthRequired => json!({
                "message": "authentication required",
                "type": "auth-required",
            }),
            Error::Conflict(reason) => json!({
                "message": reason.to_string(),
                "type": "conflict",
                "reason": reason.tag(),
            }),
            Error::NotFound => json!({
                "message": "comment not found",
                "type": "not-found",
            }),
            Error::Validation(msg) => json!({
                "message": msg,
                "type": "validation",
            }),
        })
        .expect("serializing error contents")
    }

    /// Parses a typed error body, as produced by `contents`
    pub fn parse(body: &[u8]) -> anyhow::Result<Error> {
        let data: serde_json::Value =
            serde_json::from_slice(body).context("parsing error contents")?;
        let message = || {
            String::from(
                data.get("message")
                    .and_then(|msg| msg.as_str())
                    .unwrap_or(""),
            )
        };
        Ok(
            match data
                .get("type")
                .and_then(|t| t.as_str())
                .ok_or_else(|| anyhow!("error type is not a string"))?
            {
                "server-error" => Error::ServerError(message()),
                "auth-required" => Error::AuthRequired,
                "conflict" => Error::Conflict(
                    data.get("reason")
                        .and_then(|r| r.as_str())
                        .and_then(ConflictReason::from_tag)
                        .ok_or_else(|| anyhow!("error is a conflict without a known reason"))?,
                ),
                "not-found" => Error::NotFound,
                "validation" => Error::Validation(message()),
                _ => return Err(anyhow!("error contents has unknown type")),
            },
        )
    }

    /// Classifies a failed board response
    ///
    /// Typed bodies are trusted as-is. Untyped bodies from older servers are
    /// classified by status code, and a duplicate like is only recognizable
    /// there by the wording of its message.
    pub fn from_response(status: http::StatusCode, body: &[u8]) -> Error {
        use http::StatusCode;
        if let Ok(err) = Error::parse(body) {
            return err;
        }
        let message = serde_json::from_slice::<serde_json::Value>(body)
            .ok()
            .and_then(|data| {
                data.get("message")
                    .or_else(|| data.get("error"))
                    .and_then(|m| m.as_str())
                    .map(String::from)
            });
        match (status, message) {
            (StatusCode::BAD_REQUEST | StatusCode::CONFLICT, Some(msg))
                if msg.contains(ALREADY_LIKED_MARKER) =>
            {
                Error::Conflict(ConflictReason::AlreadyLiked)
            }
            (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN, _) => Error::AuthRequired,
            (StatusCode::NOT_FOUND, _) => Error::NotFound,
            (s, msg) if s.is_client_error() => {
                Error::Validation(msg.unwrap_or_else(|| String::from("bad request")))
            }
            (s, msg) => Error::ServerError(msg.unwrap_or_else(|| s.to_string())),
        }
    }
}
