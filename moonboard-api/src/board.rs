use async_trait::async_trait;

use crate::{Comment, CommentId, Error, LikeStatus, NewReply, NewReport, PostId};

/// The board server, as seen by a signed-in (or anonymous) viewer
#[async_trait]
pub trait Board {
    /// All comments of a post, flat, in the order the board stores them
    async fn fetch_comments(&mut self, post: PostId) -> Result<Vec<Comment>, Error>;

    /// Returns the stored comment, carrying its board-assigned id
    async fn post_reply(&mut self, reply: NewReply) -> Result<Comment, Error>;

    /// Deletes the comment and every reply below it
    async fn delete_comment(&mut self, id: CommentId) -> Result<(), Error>;

    async fn like_comment(&mut self, id: CommentId) -> Result<LikeStatus, Error>;
    async fn unlike_comment(&mut self, id: CommentId) -> Result<LikeStatus, Error>;

    async fn report_comment(&mut self, report: NewReport) -> Result<(), Error>;
}
