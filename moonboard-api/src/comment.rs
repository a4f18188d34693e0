use crate::{Time, UserId};

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
#[serde(transparent)]
pub struct CommentId(pub u64);

impl CommentId {
    /// Boards encode "no parent" either as `null` or as this id
    pub const TOP_LEVEL: CommentId = CommentId(0);
}

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
#[serde(transparent)]
pub struct PostId(pub u64);

/// One comment as the board returns it, in a flat list where replies point to
/// their parent
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase", from = "WireComment")]
pub struct Comment {
    pub id: CommentId,
    pub parent_id: Option<CommentId>,
    #[serde(rename = "userId")]
    pub author_id: UserId,
    #[serde(rename = "nickname")]
    pub display_name: String,
    #[serde(rename = "profileImg")]
    pub avatar: String,
    #[serde(rename = "content")]
    pub body: String,
    pub created_at: Time,
    pub like_count: u64,
    #[serde(rename = "likedByMe")]
    pub liked_by_me: bool,
    pub report_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname_color: Option<String>,
}

/// What boards actually send, with every optional field and the legacy like
/// flag
#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireComment {
    id: CommentId,
    #[serde(default)]
    parent_id: Option<CommentId>,
    user_id: UserId,
    nickname: String,
    #[serde(default)]
    profile_img: String,
    content: String,
    created_at: Time,
    #[serde(default)]
    like_count: u64,
    #[serde(default)]
    liked_by_me: Option<bool>,
    // older boards only send `like`, transitional ones send both
    #[serde(default)]
    like: Option<bool>,
    #[serde(default)]
    report_count: u64,
    #[serde(default)]
    border_image_url: Option<String>,
    #[serde(default)]
    nickname_color: Option<String>,
}

impl From<WireComment> for Comment {
    fn from(c: WireComment) -> Comment {
        Comment {
            id: c.id,
            parent_id: c.parent_id,
            author_id: c.user_id,
            display_name: c.nickname,
            avatar: c.profile_img,
            body: c.content,
            created_at: c.created_at,
            like_count: c.like_count,
            liked_by_me: c.liked_by_me.or(c.like).unwrap_or(false),
            report_count: c.report_count,
            border_image_url: c.border_image_url.filter(|u| !u.is_empty()),
            nickname_color: c.nickname_color.filter(|c| !c.is_empty()),
        }
    }
}

impl Comment {
    /// Parent of this comment, with both encodings of "top-level" mapped to `None`
    pub fn parent(&self) -> Option<CommentId> {
        self.parent_id.filter(|p| *p != CommentId::TOP_LEVEL)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReply {
    pub post: PostId,
    /// `None` posts a new top-level comment
    pub parent_id: Option<CommentId>,
    pub text: String,
}

impl NewReply {
    pub fn validate(&self, max_len: usize) -> Result<(), crate::Error> {
        if self.text.trim().is_empty() {
            return Err(crate::Error::Validation(String::from("reply text is empty")));
        }
        if self.text.chars().count() > max_len {
            return Err(crate::Error::Validation(format!(
                "reply text is longer than {max_len} characters"
            )));
        }
        crate::validate_string(&self.text)
    }
}
