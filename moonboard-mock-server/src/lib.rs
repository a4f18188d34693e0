use std::collections::{HashSet, VecDeque};

use async_trait::async_trait;
use chrono::Utc;
use moonboard_api::{
    self as api, Board, CommentId, ConflictReason, Error, LikeStatus, NewReply, NewReport, PostId,
    UserId,
};

const MAX_TEXT_LEN: usize = 1000;

/// A board server kept in memory
pub struct MockServer {
    /// Every comment of every post, in insertion order
    comments: Vec<(PostId, api::Comment)>,
    likes: HashSet<(CommentId, UserId)>,
    reports: Vec<NewReport>,
    viewer: Option<UserId>,
    next_id: u64,
    like_payload: bool,
    failures: VecDeque<Error>,
}

impl MockServer {
    pub fn new() -> MockServer {
        MockServer {
            comments: Vec::new(),
            likes: HashSet::new(),
            reports: Vec::new(),
            viewer: None,
            next_id: 1,
            like_payload: true,
            failures: VecDeque::new(),
        }
    }

    /// Stores comments as if they had been posted earlier
    ///
    /// `liked_by_me` is ignored, likes are tracked per viewer.
    pub fn seed(&mut self, post: PostId, comments: Vec<api::Comment>) {
        for mut c in comments {
            self.next_id = std::cmp::max(self.next_id, c.id.0 + 1);
            c.liked_by_me = false;
            self.comments.push((post, c));
        }
    }

    /// Subsequent calls are made on behalf of `viewer`, anonymously if `None`
    pub fn sign_in(&mut self, viewer: Option<UserId>) {
        self.viewer = viewer;
    }

    /// Makes the next call, whichever it is, fail with `err` without any effect
    pub fn fail_next(&mut self, err: Error) {
        self.failures.push_back(err);
    }

    /// Whether like and unlike answer with the new state or with an empty body
    pub fn set_like_payload(&mut self, enabled: bool) {
        self.like_payload = enabled;
    }

    pub fn set_like_count(&mut self, id: CommentId, count: u64) {
        if let Some(c) = self.get_mut(id) {
            c.like_count = count;
        }
    }

    pub fn reports(&self) -> &[NewReport] {
        &self.reports
    }

    /// Ids of the comments of `post`, in insertion order
    pub fn test_comment_ids(&self, post: PostId) -> Vec<CommentId> {
        self.comments
            .iter()
            .filter(|(p, _)| *p == post)
            .map(|(_, c)| c.id)
            .collect()
    }

    /// What `fetch_comments` answers, bypassing injected failures
    pub fn test_flat_comments(&self, post: PostId) -> Vec<api::Comment> {
        self.comments
            .iter()
            .filter(|(p, _)| *p == post)
            .map(|(_, c)| {
                let mut c = c.clone();
                c.liked_by_me = self
                    .viewer
                    .map(|v| self.likes.contains(&(c.id, v)))
                    .unwrap_or(false);
                c
            })
            .collect()
    }

    fn injected_failure(&mut self) -> Result<(), Error> {
        match self.failures.pop_front() {
            Some(err) => {
                tracing::debug!(%err, "injecting failure");
                Err(err)
            }
            None => Ok(()),
        }
    }

    fn resolve(&self) -> Result<UserId, Error> {
        self.viewer.ok_or(Error::AuthRequired)
    }

    fn get(&self, id: CommentId) -> Result<&api::Comment, Error> {
        self.comments
            .iter()
            .map(|(_, c)| c)
            .find(|c| c.id == id)
            .ok_or(Error::NotFound)
    }

    fn get_mut(&mut self, id: CommentId) -> Option<&mut api::Comment> {
        self.comments
            .iter_mut()
            .map(|(_, c)| c)
            .find(|c| c.id == id)
    }

    fn like_status(&self, id: CommentId, liked: bool) -> Result<LikeStatus, Error> {
        let count = self.get(id)?.like_count;
        Ok(match self.like_payload {
            true => LikeStatus {
                liked_by_me: Some(liked),
                like_count: Some(count),
            },
            false => LikeStatus::default(),
        })
    }
}

impl Default for MockServer {
    fn default() -> MockServer {
        MockServer::new()
    }
}

#[async_trait]
impl Board for MockServer {
    async fn fetch_comments(&mut self, post: PostId) -> Result<Vec<api::Comment>, Error> {
        self.injected_failure()?;
        Ok(self.test_flat_comments(post))
    }

    async fn post_reply(&mut self, reply: NewReply) -> Result<api::Comment, Error> {
        self.injected_failure()?;
        let author = self.resolve()?;
        reply.validate(MAX_TEXT_LEN)?;
        if let Some(parent) = reply.parent_id.filter(|p| *p != CommentId::TOP_LEVEL) {
            if !self
                .comments
                .iter()
                .any(|(p, c)| *p == reply.post && c.id == parent)
            {
                return Err(Error::NotFound);
            }
        }
        let c = api::Comment {
            id: CommentId(self.next_id),
            parent_id: reply.parent_id,
            author_id: author,
            display_name: format!("user{}", author.0),
            avatar: String::new(),
            body: reply.text,
            created_at: Utc::now(),
            like_count: 0,
            liked_by_me: false,
            report_count: 0,
            border_image_url: None,
            nickname_color: None,
        };
        self.next_id += 1;
        self.comments.push((reply.post, c.clone()));
        Ok(c)
    }

    async fn delete_comment(&mut self, id: CommentId) -> Result<(), Error> {
        self.injected_failure()?;
        let user = self.resolve()?;
        if self.get(id)?.author_id != user {
            return Err(Error::AuthRequired);
        }
        let mut removed = HashSet::new();
        removed.insert(id);
        // Replies always come after their parent
        for (_, c) in &self.comments {
            if c.parent().map(|p| removed.contains(&p)).unwrap_or(false) {
                removed.insert(c.id);
            }
        }
        self.comments.retain(|(_, c)| !removed.contains(&c.id));
        self.likes.retain(|(c, _)| !removed.contains(c));
        Ok(())
    }

    async fn like_comment(&mut self, id: CommentId) -> Result<LikeStatus, Error> {
        self.injected_failure()?;
        let user = self.resolve()?;
        self.get(id)?;
        if !self.likes.insert((id, user)) {
            return Err(Error::Conflict(ConflictReason::AlreadyLiked));
        }
        if let Some(c) = self.get_mut(id) {
            c.like_count += 1;
        }
        self.like_status(id, true)
    }

    async fn unlike_comment(&mut self, id: CommentId) -> Result<LikeStatus, Error> {
        self.injected_failure()?;
        let user = self.resolve()?;
        self.get(id)?;
        if !self.likes.remove(&(id, user)) {
            return Err(Error::Conflict(ConflictReason::NotLiked));
        }
        if let Some(c) = self.get_mut(id) {
            c.like_count = c.like_count.saturating_sub(1);
        }
        self.like_status(id, false)
    }

    async fn report_comment(&mut self, report: NewReport) -> Result<(), Error> {
        self.injected_failure()?;
        self.resolve()?;
        report.validate(MAX_TEXT_LEN)?;
        self.get(report.comment)?;
        self.reports.push(report);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POST: PostId = PostId(7);
    const ME: UserId = UserId(1);

    fn reply(parent: Option<u64>, text: &str) -> NewReply {
        NewReply {
            post: POST,
            parent_id: parent.map(CommentId),
            text: String::from(text),
        }
    }

    #[tokio::test]
    async fn replies_get_fresh_ids() {
        let mut mock = MockServer::new();
        mock.sign_in(Some(ME));
        let a = mock.post_reply(reply(None, "a")).await.unwrap();
        let b = mock.post_reply(reply(Some(a.id.0), "b")).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(b.parent(), Some(a.id));
        assert_eq!(mock.test_comment_ids(POST), vec![a.id, b.id]);
        assert_eq!(
            mock.post_reply(reply(Some(999), "c")).await,
            Err(Error::NotFound)
        );
    }

    #[tokio::test]
    async fn anonymous_calls() {
        let mut mock = MockServer::new();
        assert_eq!(mock.fetch_comments(POST).await, Ok(Vec::new()));
        assert_eq!(
            mock.post_reply(reply(None, "a")).await,
            Err(Error::AuthRequired)
        );
    }

    #[tokio::test]
    async fn delete_cascades() {
        let mut mock = MockServer::new();
        mock.sign_in(Some(ME));
        let a = mock.post_reply(reply(None, "a")).await.unwrap();
        let b = mock.post_reply(reply(Some(a.id.0), "b")).await.unwrap();
        let c = mock.post_reply(reply(Some(b.id.0), "c")).await.unwrap();
        let d = mock.post_reply(reply(None, "d")).await.unwrap();
        mock.like_comment(c.id).await.unwrap();
        mock.delete_comment(a.id).await.unwrap();
        assert_eq!(mock.test_comment_ids(POST), vec![d.id]);
        assert_eq!(mock.like_comment(c.id).await, Err(Error::NotFound));
        assert_eq!(mock.delete_comment(a.id).await, Err(Error::NotFound));
    }

    #[tokio::test]
    async fn likes_are_per_viewer() {
        let mut mock = MockServer::new();
        mock.sign_in(Some(ME));
        let a = mock.post_reply(reply(None, "a")).await.unwrap();
        assert_eq!(
            mock.like_comment(a.id).await,
            Ok(LikeStatus {
                liked_by_me: Some(true),
                like_count: Some(1)
            })
        );
        assert_eq!(
            mock.like_comment(a.id).await,
            Err(Error::Conflict(ConflictReason::AlreadyLiked))
        );
        assert!(mock.fetch_comments(POST).await.unwrap()[0].liked_by_me);

        mock.sign_in(Some(UserId(2)));
        assert!(!mock.fetch_comments(POST).await.unwrap()[0].liked_by_me);
        assert_eq!(
            mock.unlike_comment(a.id).await,
            Err(Error::Conflict(ConflictReason::NotLiked))
        );
        mock.set_like_payload(false);
        assert_eq!(mock.like_comment(a.id).await, Ok(LikeStatus::default()));
        assert_eq!(mock.fetch_comments(POST).await.unwrap()[0].like_count, 2);
    }

    #[tokio::test]
    async fn injected_failures_have_no_effect() {
        let mut mock = MockServer::new();
        mock.sign_in(Some(ME));
        mock.fail_next(Error::ServerError(String::from("boom")));
        assert!(mock.post_reply(reply(None, "a")).await.is_err());
        assert!(mock.test_comment_ids(POST).is_empty());
        assert!(mock.post_reply(reply(None, "a")).await.is_ok());
    }
}
