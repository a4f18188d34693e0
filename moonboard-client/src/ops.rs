//! Structural edits on a reply tree
//!
//! Every edit takes the tree by value and returns the edited tree, leaving
//! snapshots held elsewhere untouched.

use crate::{
    api::{CommentId, LikeIntent},
    Comment, LikeSnapshot,
};

/// Runs `f` on every node, top-down
///
/// `f` may modify the node it is handed, or return `None` to drop it along
/// with its replies. The replies of kept nodes are visited after their parent.
pub fn rewrite<F>(tree: Vec<Comment>, f: &mut F) -> Vec<Comment>
where
    F: FnMut(Comment) -> Option<Comment>,
{
    struct Frame {
        // `None` for the top level
        node: Option<Comment>,
        pending: std::vec::IntoIter<Comment>,
        done: Vec<Comment>,
    }

    let mut frames = vec![Frame {
        node: None,
        done: Vec::with_capacity(tree.len()),
        pending: tree.into_iter(),
    }];
    while let Some(frame) = frames.last_mut() {
        match frame.pending.next() {
            Some(c) => {
                if let Some(mut c) = f(c) {
                    let children = std::mem::take(&mut c.children);
                    frames.push(Frame {
                        node: Some(c),
                        done: Vec::with_capacity(children.len()),
                        pending: children.into_iter(),
                    });
                }
            }
            None => {
                let finished = match frames.pop() {
                    Some(finished) => finished,
                    None => break,
                };
                match (finished.node, frames.last_mut()) {
                    (Some(mut node), Some(parent)) => {
                        node.children = finished.done;
                        parent.done.push(node);
                    }
                    _ => return finished.done,
                }
            }
        }
    }
    Vec::new()
}

/// Runs `f` on the node with id `id`, wherever it is
fn update<F>(tree: Vec<Comment>, id: CommentId, mut f: F) -> Vec<Comment>
where
    F: FnMut(&mut Comment),
{
    rewrite(tree, &mut |mut c| {
        if c.id == id {
            f(&mut c);
        }
        Some(c)
    })
}

/// Appends `reply` as the last child of `parent_id`
///
/// Leaves the tree unchanged if `parent_id` is nowhere in it.
pub fn insert_reply(tree: Vec<Comment>, parent_id: CommentId, reply: Comment) -> Vec<Comment> {
    let reply_id = reply.id;
    let mut reply = Some(reply);
    let res = update(tree, parent_id, |parent| {
        if let Some(reply) = reply.take() {
            parent.children.push(reply);
        }
    });
    if reply.is_some() {
        tracing::warn!(
            reply = ?reply_id,
            parent = ?parent_id,
            "parent of reply is not displayed, dropping reply"
        );
    }
    res
}

/// Removes the node with id `id` together with all of its replies
pub fn remove_cascade(tree: Vec<Comment>, id: CommentId) -> Vec<Comment> {
    rewrite(tree, &mut |c| (c.id != id).then_some(c))
}

/// Flips `liked_by_me` on the node with id `id`, without touching its count
pub fn toggle_like_flag(tree: Vec<Comment>, id: CommentId) -> Vec<Comment> {
    update(tree, id, |c| c.liked_by_me = !c.liked_by_me)
}

/// Moves the like count of `id` by one in the direction of `intent`, never
/// below zero
pub fn adjust_like_count(tree: Vec<Comment>, id: CommentId, intent: LikeIntent) -> Vec<Comment> {
    update(tree, id, |c| {
        c.like_count = match intent {
            LikeIntent::Like => c.like_count.saturating_add(1),
            LikeIntent::Unlike => c.like_count.saturating_sub(1),
        }
    })
}

pub fn set_like_state(tree: Vec<Comment>, id: CommentId, state: LikeSnapshot) -> Vec<Comment> {
    update(tree, id, |c| {
        c.liked_by_me = state.liked;
        c.like_count = state.count;
    })
}

/// Ids of `id` and everything below it, empty if `id` is not in the tree
pub fn subtree_ids(tree: &[Comment], id: CommentId) -> Vec<CommentId> {
    let mut res = Vec::new();
    if let Some(root) = Comment::find_in(tree, id) {
        let mut stack = vec![root];
        while let Some(c) = stack.pop() {
            res.push(c.id);
            stack.extend(c.children.iter());
        }
    }
    res
}
