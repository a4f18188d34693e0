use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use crate::{
    api::{self, Board, CommentId, Error, LikeIntent, NewReply, NewReport, PostId, UserId},
    ops, tree, Comment, LikeOutcome, LikeReconciler,
};

/// Slot of an unsent text
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DraftKey {
    /// The new top-level comment box
    Root,

    /// The reply box under a comment
    Reply(CommentId),
}

impl DraftKey {
    pub fn for_parent(parent: Option<CommentId>) -> DraftKey {
        match parent {
            None => DraftKey::Root,
            Some(p) => DraftKey::Reply(p),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A transient message for the viewer
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StoreConfig {
    /// Deepest level at which the reply box is offered, 0 being top-level
    /// comments
    pub reply_max_depth: usize,

    /// In characters
    pub max_reply_len: usize,

    /// In characters
    pub max_report_len: usize,
}

impl Default for StoreConfig {
    fn default() -> StoreConfig {
        StoreConfig {
            reply_max_depth: 0,
            max_reply_len: 1000,
            max_report_len: 500,
        }
    }
}

/// The comment thread of one post, as displayed to one viewer
///
/// All changes to the displayed tree go through this store. Only like
/// toggles change it before the board answered.
#[derive(Clone, Debug)]
pub struct CommentStore {
    post: PostId,
    viewer: Option<UserId>,
    config: StoreConfig,

    tree: Arc<Vec<Comment>>,
    reply_target: Option<CommentId>,
    drafts: HashMap<DraftKey, String>,
    likes_in_flight: HashSet<CommentId>,
    notices: Vec<Notice>,
}

impl CommentStore {
    pub fn new(post: PostId, viewer: Option<UserId>, config: StoreConfig) -> CommentStore {
        CommentStore {
            post,
            viewer,
            config,
            tree: Arc::new(Vec::new()),
            reply_target: None,
            drafts: HashMap::new(),
            likes_in_flight: HashSet::new(),
            notices: Vec::new(),
        }
    }

    pub fn post(&self) -> PostId {
        self.post
    }

    pub fn viewer(&self) -> Option<UserId> {
        self.viewer
    }

    pub fn set_viewer(&mut self, viewer: Option<UserId>) {
        self.viewer = viewer;
    }

    /// Snapshot of the top-level comments, replies nested inside
    pub fn comments(&self) -> Arc<Vec<Comment>> {
        self.tree.clone()
    }

    pub fn find(&self, id: CommentId) -> Option<&Comment> {
        Comment::find_in(&self.tree, id)
    }

    pub fn total_count(&self) -> usize {
        Comment::count(&self.tree)
    }

    pub fn reply_target(&self) -> Option<CommentId> {
        self.reply_target
    }

    /// Opens the reply box under `target`, closing any other one
    pub fn set_reply_target(&mut self, target: Option<CommentId>) {
        self.reply_target = target;
    }

    /// Opens the reply box under `id`, or closes it if it is the one open
    pub fn toggle_reply_target(&mut self, id: CommentId) {
        self.reply_target = match self.reply_target {
            Some(t) if t == id => None,
            _ => Some(id),
        };
    }

    pub fn can_reply_at(&self, depth: usize) -> bool {
        depth <= self.config.reply_max_depth
    }

    /// Whether `c` was written by the viewer, who may then delete it rather
    /// than report it
    pub fn is_own(&self, c: &Comment) -> bool {
        self.viewer == Some(c.author_id)
    }

    pub fn drafts(&self) -> &HashMap<DraftKey, String> {
        &self.drafts
    }

    pub fn draft(&self, key: DraftKey) -> &str {
        self.drafts.get(&key).map(|d| d as &str).unwrap_or("")
    }

    pub fn set_draft(&mut self, key: DraftKey, text: String) {
        self.drafts.insert(key, text);
    }

    pub fn cancel_draft(&mut self, key: DraftKey) {
        self.drafts.remove(&key);
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Replaces the whole thread with the one described by `flat`
    ///
    /// Like toggles still waiting for the board no longer block new toggles,
    /// the board's state now being displayed.
    pub fn load(&mut self, flat: Vec<api::Comment>) {
        let num_records = flat.len();
        self.tree = Arc::new(tree::build(flat));
        self.likes_in_flight.clear();
        tracing::info!(
            post = ?self.post,
            num_records,
            num_top_level = self.tree.len(),
            "loaded comment thread"
        );
    }

    pub async fn refresh<B: Board>(&mut self, board: &mut B) -> Result<(), Error> {
        match board.fetch_comments(self.post).await {
            Ok(flat) => {
                self.load(flat);
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Posts `text` as a reply to `parent`, or as a top-level comment
    ///
    /// Returns the id the board assigned. On failure the text stays available
    /// in its draft slot.
    pub async fn submit_reply<B: Board>(
        &mut self,
        board: &mut B,
        parent: Option<CommentId>,
        text: String,
    ) -> Result<CommentId, Error> {
        let reply = NewReply {
            post: self.post,
            parent_id: parent,
            text,
        };
        let res = match self.check_reply(&reply) {
            Ok(()) => board.post_reply(reply.clone()).await,
            Err(err) => Err(err),
        };
        match res {
            Ok(c) => Ok(self.apply_reply(parent, c)),
            Err(err) => {
                self.keep_draft(DraftKey::for_parent(parent), reply.text);
                Err(self.fail(err))
            }
        }
    }

    /// Submits the text currently held in `key`
    pub async fn submit_draft<B: Board>(
        &mut self,
        board: &mut B,
        key: DraftKey,
    ) -> Result<CommentId, Error> {
        let parent = match key {
            DraftKey::Root => None,
            DraftKey::Reply(p) => Some(p),
        };
        let text = self.draft(key).to_string();
        self.submit_reply(board, parent, text).await
    }

    fn check_reply(&self, reply: &NewReply) -> Result<(), Error> {
        if self.viewer.is_none() {
            return Err(Error::AuthRequired);
        }
        reply.validate(self.config.max_reply_len)
    }

    fn keep_draft(&mut self, key: DraftKey, text: String) {
        let slot = self.drafts.entry(key).or_default();
        if slot.is_empty() {
            *slot = text;
        }
    }

    /// Displays a comment the board accepted
    ///
    /// A reply that is already displayed, because a refresh brought it in
    /// first, is not added twice.
    pub fn apply_reply(&mut self, parent: Option<CommentId>, c: api::Comment) -> CommentId {
        let id = c.id;
        if self.find(id).is_some() {
            tracing::debug!(comment = ?id, ?parent, "reply already displayed");
        } else {
            let mut node = Comment::from(c);
            node.parent_id = parent;
            match parent {
                None => Arc::make_mut(&mut self.tree).push(node),
                Some(p) => self.update_tree(|t| ops::insert_reply(t, p, node)),
            }
            tracing::debug!(comment = ?id, ?parent, "reply added");
        }
        self.drafts.remove(&DraftKey::for_parent(parent));
        if self.reply_target == parent {
            self.reply_target = None;
        }
        id
    }

    /// Deletes `id` and its replies, once the board confirmed it did
    pub async fn request_delete<B: Board>(
        &mut self,
        board: &mut B,
        id: CommentId,
    ) -> Result<(), Error> {
        if self.viewer.is_none() {
            return Err(self.fail(Error::AuthRequired));
        }
        match board.delete_comment(id).await {
            Ok(()) => {
                self.apply_delete(id);
                self.notify(NoticeKind::Success, String::from("Comment deleted"));
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    pub fn apply_delete(&mut self, id: CommentId) {
        let removed = ops::subtree_ids(&self.tree, id);
        self.update_tree(|t| ops::remove_cascade(t, id));
        for r in &removed {
            self.drafts.remove(&DraftKey::Reply(*r));
            if self.reply_target == Some(*r) {
                self.reply_target = None;
            }
        }
        tracing::debug!(comment = ?id, num_removed = removed.len(), "comment deleted");
    }

    /// Displays the toggled like on `id` right away
    ///
    /// Returns `None` without changing anything when `id` is not displayed, or
    /// when a toggle on it is still waiting for the board.
    pub fn begin_like(&mut self, id: CommentId) -> Result<Option<LikeReconciler>, Error> {
        if self.viewer.is_none() {
            return Err(self.fail(Error::AuthRequired));
        }
        if self.likes_in_flight.contains(&id) {
            tracing::debug!(comment = ?id, "like toggle already in flight, ignoring");
            return Ok(None);
        }
        let baseline = match self.find(id) {
            Some(c) => c.like_state(),
            None => {
                tracing::debug!(comment = ?id, "like toggle on comment not displayed");
                return Ok(None);
            }
        };
        let r = LikeReconciler::begin(id, baseline);
        let intent = r.intent();
        self.update_tree(|t| ops::adjust_like_count(ops::toggle_like_flag(t, id), id, intent));
        self.likes_in_flight.insert(id);
        Ok(Some(r))
    }

    /// Reconciles the displayed like with the board's answer
    pub fn finish_like(
        &mut self,
        r: LikeReconciler,
        res: Result<api::LikeStatus, Error>,
    ) -> LikeOutcome {
        let id = r.comment();
        self.likes_in_flight.remove(&id);
        let outcome = r.settle(res);
        if self.find(id).is_none() {
            tracing::debug!(comment = ?id, "like answer for comment no longer displayed");
        }
        let state = outcome.state();
        self.update_tree(|t| ops::set_like_state(t, id, state));
        match &outcome {
            LikeOutcome::Committed(_) => (),
            LikeOutcome::RolledBack { error, .. } => {
                tracing::info!(comment = ?id, %error, "like toggle rolled back");
                self.notify(NoticeKind::Error, error.to_string());
            }
            LikeOutcome::ForceSynced { reason, .. } => {
                tracing::info!(comment = ?id, %reason, "like toggle synced with board");
                self.notify(NoticeKind::Error, reason.to_string());
            }
        }
        outcome
    }

    /// Gives up on a toggle whose answer will never be delivered
    ///
    /// The state from before the toggle is displayed again, unless the thread
    /// was reloaded in the meantime.
    pub fn abort_like(&mut self, r: LikeReconciler) {
        let id = r.comment();
        if self.likes_in_flight.remove(&id) {
            let baseline = r.baseline();
            self.update_tree(|t| ops::set_like_state(t, id, baseline));
            tracing::debug!(comment = ?id, "like toggle aborted");
        }
    }

    /// Likes `id` if the viewer did not, unlikes it otherwise
    ///
    /// `Ok(None)` means the toggle was ignored, see `begin_like`.
    pub async fn toggle_like<B: Board>(
        &mut self,
        board: &mut B,
        id: CommentId,
    ) -> Result<Option<LikeOutcome>, Error> {
        let r = match self.begin_like(id)? {
            Some(r) => r,
            None => return Ok(None),
        };
        let res = match r.intent() {
            LikeIntent::Like => board.like_comment(id).await,
            LikeIntent::Unlike => board.unlike_comment(id).await,
        };
        Ok(Some(self.finish_like(r, res)))
    }

    /// Reports another user's comment to the moderators
    pub async fn report<B: Board>(
        &mut self,
        board: &mut B,
        id: CommentId,
        reason: String,
    ) -> Result<(), Error> {
        let report = NewReport {
            comment: id,
            reason,
        };
        let res = match self.check_report(&report) {
            Ok(()) => board.report_comment(report).await,
            Err(err) => Err(err),
        };
        match res {
            Ok(()) => {
                self.notify(NoticeKind::Success, String::from("Report submitted"));
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    fn check_report(&self, report: &NewReport) -> Result<(), Error> {
        if self.viewer.is_none() {
            return Err(Error::AuthRequired);
        }
        let c = self.find(report.comment).ok_or(Error::NotFound)?;
        if self.is_own(c) {
            return Err(Error::Validation(String::from(
                "cannot report your own comment",
            )));
        }
        report.validate(self.config.max_report_len)
    }

    fn update_tree(&mut self, f: impl FnOnce(Vec<Comment>) -> Vec<Comment>) {
        let tree = std::mem::take(&mut self.tree);
        let tree = Arc::try_unwrap(tree).unwrap_or_else(|shared| (*shared).clone());
        self.tree = Arc::new(f(tree));
    }

    fn notify(&mut self, kind: NoticeKind, message: String) {
        self.notices.push(Notice { kind, message });
    }

    fn fail(&mut self, err: Error) -> Error {
        tracing::info!(post = ?self.post, %err, "comment command failed");
        self.notify(NoticeKind::Error, err.to_string());
        err
    }
}
