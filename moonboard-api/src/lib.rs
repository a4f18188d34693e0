use chrono::Utc;

mod board;
pub use board::Board;

mod comment;
pub use comment::{Comment, CommentId, NewReply, PostId};

mod error;
pub use error::{ConflictReason, Error, ALREADY_LIKED_MARKER};

mod like;
pub use like::{LikeIntent, LikeStatus};

mod report;
pub use report::NewReport;

mod user;
pub use user::UserId;

pub type Time = chrono::DateTime<Utc>;

/// Rejects strings the board server refuses to store
///
/// Callers decide separately whether an empty string is acceptable.
pub fn validate_string(s: &str) -> Result<(), Error> {
    if s.contains('\0') {
        return Err(Error::Validation(String::from(
            "null bytes are not allowed in text",
        )));
    }
    Ok(())
}
