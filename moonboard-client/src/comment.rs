use crate::{
    api::{self, CommentId, Time, UserId},
    LikeSnapshot,
};

/// A comment together with the replies nested under it
///
/// Cloning and dropping walk the replies with an explicit stack, so threads
/// of any depth are safe to handle.
#[derive(Debug, Eq, PartialEq)]
pub struct Comment {
    pub id: CommentId,

    /// Parent as declared by the board, kept even when the node ended up at
    /// the top level because that parent was missing
    pub parent_id: Option<CommentId>,

    pub author_id: UserId,
    pub display_name: String,
    pub avatar: String,
    pub body: String,
    pub created_at: Time,

    pub like_count: u64,
    pub liked_by_me: bool,
    pub report_count: u64,

    pub border_image_url: Option<String>,
    pub nickname_color: Option<String>,

    /// Replies, in the order the board returned them
    pub children: Vec<Comment>,
}

impl From<api::Comment> for Comment {
    fn from(c: api::Comment) -> Comment {
        Comment {
            id: c.id,
            parent_id: c.parent(),
            author_id: c.author_id,
            display_name: c.display_name,
            avatar: c.avatar,
            body: c.body,
            created_at: c.created_at,
            like_count: c.like_count,
            liked_by_me: c.liked_by_me,
            report_count: c.report_count,
            border_image_url: c.border_image_url,
            nickname_color: c.nickname_color,
            children: Vec::new(),
        }
    }
}

impl Clone for Comment {
    fn clone(&self) -> Comment {
        let mut frames = vec![(self.clone_node(), self.children.iter())];
        while let Some((_, replies)) = frames.last_mut() {
            match replies.next() {
                Some(r) => frames.push((r.clone_node(), r.children.iter())),
                None => {
                    let (node, _) = match frames.pop() {
                        Some(frame) => frame,
                        None => break,
                    };
                    match frames.last_mut() {
                        Some((parent, _)) => parent.children.push(node),
                        None => return node,
                    }
                }
            }
        }
        self.clone_node()
    }
}

impl Drop for Comment {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut c) = stack.pop() {
            stack.append(&mut c.children);
        }
    }
}

impl Comment {
    /// This node alone, with room for its replies
    fn clone_node(&self) -> Comment {
        Comment {
            id: self.id,
            parent_id: self.parent_id,
            author_id: self.author_id,
            display_name: self.display_name.clone(),
            avatar: self.avatar.clone(),
            body: self.body.clone(),
            created_at: self.created_at,
            like_count: self.like_count,
            liked_by_me: self.liked_by_me,
            report_count: self.report_count,
            border_image_url: self.border_image_url.clone(),
            nickname_color: self.nickname_color.clone(),
            children: Vec::with_capacity(self.children.len()),
        }
    }

    /// The flat record for this node alone, without its replies
    pub fn to_record(&self) -> api::Comment {
        api::Comment {
            id: self.id,
            parent_id: self.parent_id,
            author_id: self.author_id,
            display_name: self.display_name.clone(),
            avatar: self.avatar.clone(),
            body: self.body.clone(),
            created_at: self.created_at,
            like_count: self.like_count,
            liked_by_me: self.liked_by_me,
            report_count: self.report_count,
            border_image_url: self.border_image_url.clone(),
            nickname_color: self.nickname_color.clone(),
        }
    }

    pub fn like_state(&self) -> LikeSnapshot {
        LikeSnapshot {
            liked: self.liked_by_me,
            count: self.like_count,
        }
    }

    pub fn find_in(comments: &[Comment], id: CommentId) -> Option<&Comment> {
        let mut stack = comments.iter().rev().collect::<Vec<_>>();
        while let Some(c) = stack.pop() {
            if c.id == id {
                return Some(c);
            }
            stack.extend(c.children.iter().rev());
        }
        None
    }

    /// Number of comments in `comments`, replies included
    pub fn count(comments: &[Comment]) -> usize {
        let mut stack = comments.iter().collect::<Vec<_>>();
        let mut res = 0;
        while let Some(c) = stack.pop() {
            res += 1;
            stack.extend(c.children.iter());
        }
        res
    }
}
