mod comment;
pub use comment::Comment;

mod like;
pub use like::{LikeOutcome, LikeReconciler, LikeSnapshot};

pub mod ops;

mod store;
pub use store::{CommentStore, DraftKey, Notice, NoticeKind, StoreConfig};

pub mod tree;

#[cfg(test)]
mod fuzz;

pub mod api {
    pub use moonboard_api::*;
}
